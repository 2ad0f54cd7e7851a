//! Capability traits for package scripts.
//!
//! A package may or may not provide a script, and a script may implement any
//! subset of the `global`, `local` and `build` hooks. Missing capabilities are
//! a normal no-op, not an error.

use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

use super::store::{ConfigObject, Scope};

/// Errors surfaced by loading or running a package hook.
#[derive(Debug, Error)]
pub enum HookError {
  /// The package script could not be loaded.
  #[error("failed to load {}: {message}", path.display())]
  Load { path: PathBuf, message: String },

  /// The hook raised an error while running.
  #[error("{scope} hook raised an error: {message}")]
  Raised { scope: Scope, message: String },

  /// The hook completed by reporting a failure through its `done` callback.
  #[error("{scope} hook failed: {message}")]
  Reported { scope: Scope, message: String },

  /// The hook left a configuration object that cannot be stored.
  #[error("{scope} hook produced an invalid config object: {message}")]
  InvalidConfig { scope: Scope, message: String },
}

/// Arguments passed to every hook.
///
/// `global` is the single object shared by all packages in the run; `local`
/// belongs to `package` alone.
pub struct HookArgs<'a> {
  pub env: &'a str,
  pub package: &'a str,
  pub global: &'a mut ConfigObject,
  pub local: &'a mut ConfigObject,
}

/// A loaded package script.
#[allow(async_fn_in_trait)]
pub trait PackageScript {
  /// Whether the script implements the hook for `scope`.
  fn supports(&self, scope: Scope) -> bool;

  /// Run the hook for `scope`. Only called when [`PackageScript::supports`] is true.
  async fn invoke(&self, scope: Scope, args: HookArgs<'_>) -> Result<(), HookError>;
}

/// Locates package scripts by package name.
pub trait ScriptLoader {
  type Script: PackageScript;

  /// Load the script for `package`, or `None` if the package has none.
  fn load(&self, package: &str) -> Result<Option<Rc<Self::Script>>, HookError>;
}
