//! Configuration store and package configurator.
//!
//! [`Configurator::configure`] looks up a package's script and, when it
//! implements the requested [`Scope`], runs that hook against the run's
//! [`ConfigStore`]. The store is passed explicitly at every call so the
//! sharing of the global object between packages is visible to the caller.

mod script;
mod store;

use tracing::debug;

pub use script::{HookArgs, HookError, PackageScript, ScriptLoader};
pub use store::{ConfigObject, ConfigStore, Scope};

/// Runs package hooks for one pipeline run.
pub struct Configurator<'a, L: ScriptLoader> {
  loader: &'a L,
  env: &'a str,
}

impl<'a, L: ScriptLoader> Configurator<'a, L> {
  pub fn new(loader: &'a L, env: &'a str) -> Self {
    Self { loader, env }
  }

  /// Invoke `package`'s hook for `scope`.
  ///
  /// The package's local object is created on first reference, even when the
  /// package has no script. A missing script or hook completes immediately
  /// with `Ok(())`.
  pub async fn configure(&self, store: &mut ConfigStore, package: &str, scope: Scope) -> Result<(), HookError> {
    let (global, local) = store.split_mut(package);

    let Some(script) = self.loader.load(package)? else {
      debug!(package = %package, scope = %scope, "no configuration script");
      return Ok(());
    };

    if !script.supports(scope) {
      debug!(package = %package, scope = %scope, "no hook for scope");
      return Ok(());
    }

    debug!(package = %package, scope = %scope, "running hook");
    let args = HookArgs {
      env: self.env,
      package,
      global,
      local,
    };
    script.invoke(scope, args).await
  }
}
