//! Pipeline orchestration.
//!
//! [`Pipeline::run`] is the body executed by every trigger:
//!
//! 1. Discover packages
//! 2. Run every package's `global` hook, in list order
//! 3. Run every package's `local` hook, in list order
//! 4. Write every package's local config module
//! 5. Write the global config module
//! 6. Build every package, stopping at the first failure
//!
//! Each run owns a fresh [`PackageIndex`], [`ConfigStore`] and script loader,
//! so nothing carries over between runs. Hook failures in steps 2 and 3 are
//! recorded and the run continues; I/O failures abort the run.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::build::{BuildReport, build_all};
use crate::config::{ConfigStore, Configurator, HookError, Scope, ScriptLoader};
use crate::consts::DEFAULT_ENV;
use crate::discover::{DiscoverError, OrderPolicy, PackageIndex};
use crate::fs::{FileSystem, OsFileSystem};
use crate::lua::{LuaScriptLoader, ScriptError};
use crate::module::{ModuleError, write_global_config_module, write_local_config_module};

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("discovery failed: {0}")]
  Discover(#[from] DiscoverError),

  #[error("config module error: {0}")]
  Module(#[from] ModuleError),

  #[error("script host error: {0}")]
  Script(#[from] ScriptError),

  #[error("failed to start async runtime: {0}")]
  Runtime(#[source] io::Error),
}

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
  /// Discovery root; packages are its immediate children.
  pub root: PathBuf,

  /// Environment name passed to every hook.
  pub env: String,

  /// Build-order override.
  pub policy: OrderPolicy,

  /// Treat recorded configure errors as a failed run.
  pub strict: bool,
}

impl PipelineOptions {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      env: DEFAULT_ENV.to_string(),
      policy: OrderPolicy::default(),
      strict: false,
    }
  }
}

/// A `global` or `local` hook that failed during a run.
#[derive(Debug)]
pub struct ConfigureFailure {
  pub package: String,
  pub scope: Scope,
  pub error: HookError,
}

/// Result of a completed pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
  /// Discovered packages, in build order.
  pub packages: Vec<String>,

  /// Configure hooks that failed (the run continued past them).
  pub configure_errors: Vec<ConfigureFailure>,

  /// Outcome of the build pass.
  pub build: BuildReport,

  /// Whether configure errors fail the run.
  pub strict: bool,

  /// Wall time of the whole run.
  pub duration: Duration,
}

impl PipelineReport {
  pub fn is_success(&self) -> bool {
    self.build.is_success() && !(self.strict && !self.configure_errors.is_empty())
  }
}

/// The discover, configure, write, build pipeline.
pub struct Pipeline<F: FileSystem = OsFileSystem> {
  fs: F,
  options: PipelineOptions,
}

impl Pipeline<OsFileSystem> {
  pub fn new(options: PipelineOptions) -> Self {
    Self::with_fs(OsFileSystem, options)
  }
}

impl<F: FileSystem> Pipeline<F> {
  pub fn with_fs(fs: F, options: PipelineOptions) -> Self {
    Self { fs, options }
  }

  pub fn options(&self) -> &PipelineOptions {
    &self.options
  }

  /// Run the pipeline with package scripts loaded into a fresh Lua runtime.
  pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
    let loader = LuaScriptLoader::new(&self.options.root, &self.options.env)?;
    self.run_with(&loader).await
  }

  /// Run the pipeline with scripts provided by `loader`.
  pub async fn run_with<L: ScriptLoader>(&self, loader: &L) -> Result<PipelineReport, PipelineError> {
    let started = Instant::now();
    let root = &self.options.root;
    info!(root = %root.display(), env = %self.options.env, "starting pipeline");

    let mut index = PackageIndex::new(&self.fs, root.clone(), self.options.policy.clone());
    let packages = index.packages()?.to_vec();
    info!(count = packages.len(), "discovered packages");

    let configurator = Configurator::new(loader, &self.options.env);
    let mut store = ConfigStore::new();
    let mut configure_errors = Vec::new();

    for scope in [Scope::Global, Scope::Local] {
      debug!(scope = %scope, "configure pass");
      for package in &packages {
        if let Err(error) = configurator.configure(&mut store, package, scope).await {
          warn!(package = %package, scope = %scope, error = %error, "configure failed");
          configure_errors.push(ConfigureFailure {
            package: package.clone(),
            scope,
            error,
          });
        }
      }
    }

    for package in &packages {
      write_local_config_module(&self.fs, root, package, &store)?;
    }
    let global = write_global_config_module(&self.fs, root, &store)?;
    debug!(path = %global.display(), "config modules written");

    let build = build_all(&configurator, &mut store, &packages).await;

    let report = PipelineReport {
      packages,
      configure_errors,
      build,
      strict: self.options.strict,
      duration: started.elapsed(),
    };
    info!(
      success = report.is_success(),
      configure_errors = report.configure_errors.len(),
      duration_ms = report.duration.as_millis() as u64,
      "pipeline complete"
    );
    Ok(report)
  }

  /// Drive [`Pipeline::run`] to completion on a current-thread runtime.
  pub fn run_blocking(&self) -> Result<PipelineReport, PipelineError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(PipelineError::Runtime)?;
    runtime.block_on(self.run())
  }
}
