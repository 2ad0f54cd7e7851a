//! The sequential build pass.

use tracing::{error, info};

use crate::build::BuildReport;
use crate::config::{ConfigStore, Configurator, HookError, Scope, ScriptLoader};

/// Build a single package by running its `build` hook.
///
/// A package without a build hook succeeds immediately.
pub async fn build_package<L: ScriptLoader>(
  configurator: &Configurator<'_, L>,
  store: &mut ConfigStore,
  package: &str,
) -> Result<(), HookError> {
  info!(package = %package, "building");
  match configurator.configure(store, package, Scope::Build).await {
    Ok(()) => {
      info!(package = %package, "package built");
      Ok(())
    }
    Err(e) => {
      error!(package = %package, error = %e, "build failed");
      Err(e)
    }
  }
}

/// Build `packages` in order, one at a time, stopping at the first failure.
///
/// Packages after the failed one are recorded as skipped; their hooks never run.
pub async fn build_all<L: ScriptLoader>(
  configurator: &Configurator<'_, L>,
  store: &mut ConfigStore,
  packages: &[String],
) -> BuildReport {
  let mut report = BuildReport::default();

  for (idx, package) in packages.iter().enumerate() {
    match build_package(configurator, store, package).await {
      Ok(()) => report.built.push(package.clone()),
      Err(e) => {
        report.build_failed = Some((package.clone(), e));
        report.build_skipped = packages[idx + 1..].to_vec();
        break;
      }
    }
  }

  info!(
    built = report.built.len(),
    failed = report.build_failed.is_some(),
    skipped = report.build_skipped.len(),
    "build pass complete"
  );
  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{FakeLoader, FakeScript, fail};
  use tracing_test::traced_test;

  fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[tokio::test(flavor = "current_thread")]
  async fn stops_at_first_failure() {
    let loader = FakeLoader::default()
      .with("p1", FakeScript::new().on(Scope::Build, |_| Ok(())))
      .with("p2", FakeScript::new().on(Scope::Build, |_| fail(Scope::Build, "E")))
      .with("p3", FakeScript::new().on(Scope::Build, |_| Ok(())));
    let configurator = Configurator::new(&loader, "test");
    let mut store = ConfigStore::new();

    let report = build_all(&configurator, &mut store, &names(&["p1", "p2", "p3"])).await;

    assert_eq!(loader.calls_for(Scope::Build), names(&["p1", "p2"]));
    assert_eq!(report.built, names(&["p1"]));
    let (failed, err) = report.build_failed.as_ref().unwrap();
    assert_eq!(failed, "p2");
    assert!(err.to_string().contains("E"));
    assert_eq!(report.build_skipped, names(&["p3"]));
    assert!(!report.is_success());
    assert_eq!(report.total(), 3);
  }

  #[tokio::test(flavor = "current_thread")]
  async fn packages_without_build_hook_succeed() {
    let loader = FakeLoader::default().with("web", FakeScript::new().on(Scope::Global, |_| Ok(())));
    let configurator = Configurator::new(&loader, "test");
    let mut store = ConfigStore::new();

    let report = build_all(&configurator, &mut store, &names(&["web", "api"])).await;

    assert!(report.is_success());
    assert_eq!(report.built, names(&["web", "api"]));
    assert!(loader.calls().is_empty());
  }

  #[tokio::test(flavor = "current_thread")]
  async fn empty_pass_succeeds() {
    let loader = FakeLoader::default();
    let configurator = Configurator::new(&loader, "test");
    let report = build_all(&configurator, &mut ConfigStore::new(), &[]).await;
    assert!(report.is_success());
    assert_eq!(report.total(), 0);
  }

  #[tokio::test(flavor = "current_thread")]
  #[traced_test]
  async fn failure_is_logged_with_package() {
    let loader = FakeLoader::default().with("api", FakeScript::new().on(Scope::Build, |_| fail(Scope::Build, "linker error")));
    let configurator = Configurator::new(&loader, "test");

    let result = build_package(&configurator, &mut ConfigStore::new(), "api").await;

    assert!(result.is_err());
    assert!(logs_contain("build failed"));
    assert!(logs_contain("linker error"));
  }
}
