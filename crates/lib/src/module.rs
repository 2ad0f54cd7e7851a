//! Generated config modules.
//!
//! Each package gets a `local.config.json` holding its local configuration,
//! and the root gets one `global.config.json`. A module records the export it
//! assigns (`GLOBAL_CONFIG` or `LOCAL_CONFIG`) next to the configuration
//! object, so consumers load it through [`ConfigModule::load`] instead of
//! evaluating code.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigObject, ConfigStore};
use crate::consts::{GLOBAL_MODULE_NAME, LOCAL_MODULE_NAME, MODULE_DIR};
use crate::fs::FileSystem;

/// Errors that can occur while writing or reading config modules.
#[derive(Debug, Error)]
pub enum ModuleError {
  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to write config module {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to read config module {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to remove config module {}: {source}", path.display())]
  Remove { path: PathBuf, source: io::Error },

  #[error("failed to serialize config module: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("invalid config module {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },
}

/// The export a config module assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleKind {
  #[serde(rename = "GLOBAL_CONFIG")]
  Global,
  #[serde(rename = "LOCAL_CONFIG")]
  Local,
}

impl ModuleKind {
  /// Any file name containing `global` is a global module; everything else is local.
  pub fn from_file_name(name: &str) -> Self {
    if name.contains("global") {
      ModuleKind::Global
    } else {
      ModuleKind::Local
    }
  }

  pub fn export_name(self) -> &'static str {
    match self {
      ModuleKind::Global => "GLOBAL_CONFIG",
      ModuleKind::Local => "LOCAL_CONFIG",
    }
  }
}

/// Content of a generated config module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigModule {
  pub export: ModuleKind,
  pub config: ConfigObject,
}

impl ConfigModule {
  pub fn new(export: ModuleKind, config: ConfigObject) -> Self {
    Self { export, config }
  }

  /// Serialize to the on-disk form: pretty JSON with sorted keys and a trailing newline.
  pub fn render(&self) -> Result<String, ModuleError> {
    let mut content = serde_json::to_string_pretty(self).map_err(ModuleError::Serialize)?;
    content.push('\n');
    Ok(content)
  }

  /// Load a generated module through `fs`.
  pub fn load<F: FileSystem + ?Sized>(fs: &F, path: &Path) -> Result<Self, ModuleError> {
    let content = fs.read_to_string(path).map_err(|source| ModuleError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ModuleError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Path of the module `name` generated under `root`.
pub fn module_path(root: &Path, name: &str) -> PathBuf {
  root.join(MODULE_DIR).join(name)
}

/// Path of a package's local config module.
pub fn local_module_path(root: &Path, package: &str) -> PathBuf {
  module_path(&root.join(package), LOCAL_MODULE_NAME)
}

/// Path of the global config module.
pub fn global_module_path(root: &Path) -> PathBuf {
  module_path(root, GLOBAL_MODULE_NAME)
}

/// Write `config` as the module `name` under `root`.
///
/// The module kind is derived from `name` alone. The full content is rendered
/// before the destination is touched.
pub fn write_config_module<F: FileSystem + ?Sized>(
  fs: &F,
  root: &Path,
  name: &str,
  config: &ConfigObject,
) -> Result<PathBuf, ModuleError> {
  let module = ConfigModule::new(ModuleKind::from_file_name(name), config.clone());
  let content = module.render()?;

  let dir = root.join(MODULE_DIR);
  fs.create_dir_all(&dir)
    .map_err(|source| ModuleError::CreateDir { path: dir.clone(), source })?;

  let path = dir.join(name);
  fs.write(&path, &content).map_err(|source| ModuleError::Write {
    path: path.clone(),
    source,
  })?;

  debug!(path = %path.display(), export = module.export.export_name(), "wrote config module");
  Ok(path)
}

/// Write `package`'s local config module inside its directory.
pub fn write_local_config_module<F: FileSystem + ?Sized>(
  fs: &F,
  root: &Path,
  package: &str,
  store: &ConfigStore,
) -> Result<PathBuf, ModuleError> {
  let empty = ConfigObject::new();
  let config = store.local(package).unwrap_or(&empty);
  write_config_module(fs, &root.join(package), LOCAL_MODULE_NAME, config)
}

/// Write the single global config module at the root.
pub fn write_global_config_module<F: FileSystem + ?Sized>(
  fs: &F,
  root: &Path,
  store: &ConfigStore,
) -> Result<PathBuf, ModuleError> {
  write_config_module(fs, root, GLOBAL_MODULE_NAME, store.global())
}

/// Remove a package's generated local config module.
///
/// Returns `false` if there was nothing to remove.
pub fn remove_config_module<F: FileSystem + ?Sized>(fs: &F, root: &Path, package: &str) -> Result<bool, ModuleError> {
  let path = local_module_path(root, package);
  match fs.remove_file(&path) {
    Ok(()) => {
      debug!(path = %path.display(), "removed config module");
      Ok(true)
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(source) => Err(ModuleError::Remove { path, source }),
  }
}
