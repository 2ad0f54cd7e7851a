//! The configuration store for one pipeline run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A configuration object: a JSON-style key/value map.
pub type ConfigObject = serde_json::Map<String, serde_json::Value>;

/// Which hook of a package script is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  Global,
  Local,
  Build,
}

impl Scope {
  pub const ALL: [Scope; 3] = [Scope::Global, Scope::Local, Scope::Build];

  /// Name of the hook function in a package script.
  pub fn as_str(self) -> &'static str {
    match self {
      Scope::Global => "global",
      Scope::Local => "local",
      Scope::Build => "build",
    }
  }
}

impl fmt::Display for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Global configuration plus one local configuration per package.
///
/// Local entries are created on first access and never removed, so every
/// package touched during a run has exactly one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigStore {
  global: ConfigObject,
  local: BTreeMap<String, ConfigObject>,
}

impl ConfigStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn global(&self) -> &ConfigObject {
    &self.global
  }

  pub fn global_mut(&mut self) -> &mut ConfigObject {
    &mut self.global
  }

  /// The package's local object, if it has been referenced.
  pub fn local(&self, package: &str) -> Option<&ConfigObject> {
    self.local.get(package)
  }

  /// The package's local object, created empty on first reference.
  pub fn local_mut(&mut self, package: &str) -> &mut ConfigObject {
    self.local.entry(package.to_string()).or_default()
  }

  /// Borrow the shared global object and the package's local object together.
  pub fn split_mut(&mut self, package: &str) -> (&mut ConfigObject, &mut ConfigObject) {
    let local = self.local.entry(package.to_string()).or_default();
    (&mut self.global, local)
  }

  /// Names of all packages with a local entry, sorted.
  pub fn packages(&self) -> impl Iterator<Item = &str> {
    self.local.keys().map(String::as_str)
  }
}
