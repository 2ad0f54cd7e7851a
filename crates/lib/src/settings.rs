//! Run settings.
//!
//! Settings are resolved once per process, highest precedence first, from
//! command-line overrides, the `MBUILD_ENV` environment variable,
//! `<root>/mbuild.toml`, and built-in defaults:
//!
//! ```toml
//! env = "development"
//! promote = ["lbclient"]
//! strict = false
//!
//! [watch]
//! debounce_ms = 300
//! ignore = ["node_modules", "build", "target"]
//! ignore_globs = ["**/test/**", "**/*.bundle.*"]
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use glob::Pattern;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_ENV, DEFAULT_PROMOTED_PACKAGE, ENV_VAR, SETTINGS_FILE};
use crate::discover::OrderPolicy;
use crate::pipeline::PipelineOptions;

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("root directory {} is not accessible: {source}", path.display())]
  Root { path: PathBuf, source: io::Error },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("invalid watch ignore pattern '{pattern}': {source}")]
  InvalidPattern { pattern: String, source: glob::PatternError },
}

/// Contents of `mbuild.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
  pub env: Option<String>,
  pub promote: Option<Vec<String>>,
  pub strict: Option<bool>,
  pub watch: WatchFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchFile {
  pub debounce_ms: Option<u64>,
  pub ignore: Option<Vec<String>>,
  pub ignore_globs: Option<Vec<String>>,
}

impl SettingsFile {
  /// Load `<root>/mbuild.toml`, or defaults if it does not exist.
  pub fn load(root: &Path) -> Result<Self, SettingsError> {
    let path = root.join(SETTINGS_FILE);
    let content = match std::fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no settings file");
        return Ok(Self::default());
      }
      Err(source) => return Err(SettingsError::Read { path, source }),
    };
    toml::from_str(&content).map_err(|source| SettingsError::Parse { path, source })
  }
}

/// Watch-mode settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
  /// Quiet period after the last change before a run starts.
  pub debounce: Duration,

  /// Directory names whose changes never trigger a run.
  pub ignore: Vec<String>,

  /// Patterns matched against root-relative paths; matches never trigger a run.
  pub ignore_globs: Vec<Pattern>,
}

const DEFAULT_IGNORE_GLOBS: [&str; 2] = ["**/test/**", "**/*.bundle.*"];

impl Default for WatchSettings {
  fn default() -> Self {
    Self {
      debounce: Duration::from_millis(300),
      ignore: ["node_modules", "build", "target"].map(String::from).to_vec(),
      ignore_globs: DEFAULT_IGNORE_GLOBS
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect(),
    }
  }
}

fn compile_globs(patterns: Vec<String>) -> Result<Vec<Pattern>, SettingsError> {
  patterns
    .into_iter()
    .map(|pattern| Pattern::new(&pattern).map_err(|source| SettingsError::InvalidPattern { pattern, source }))
    .collect()
}

/// Command-line overrides; `None` leaves the lower layers in charge.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
  pub env: Option<String>,
  pub promote: Option<Vec<String>>,
  pub strict: Option<bool>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
  /// Canonical discovery root.
  pub root: PathBuf,
  pub env: String,
  pub promote: Vec<String>,
  pub strict: bool,
  pub watch: WatchSettings,
}

impl Settings {
  /// Resolve settings for `root`.
  pub fn resolve(root: &Path, overrides: Overrides) -> Result<Self, SettingsError> {
    let root = dunce::canonicalize(root).map_err(|source| SettingsError::Root {
      path: root.to_path_buf(),
      source,
    })?;
    let file = SettingsFile::load(&root)?;

    let env = overrides
      .env
      .or_else(|| std::env::var(ENV_VAR).ok().filter(|v| !v.is_empty()))
      .or(file.env)
      .unwrap_or_else(|| DEFAULT_ENV.to_string());

    let promote = overrides
      .promote
      .or(file.promote)
      .unwrap_or_else(|| vec![DEFAULT_PROMOTED_PACKAGE.to_string()]);

    let defaults = WatchSettings::default();
    let watch = WatchSettings {
      debounce: file.watch.debounce_ms.map(Duration::from_millis).unwrap_or(defaults.debounce),
      ignore: file.watch.ignore.unwrap_or(defaults.ignore),
      ignore_globs: match file.watch.ignore_globs {
        Some(patterns) => compile_globs(patterns)?,
        None => defaults.ignore_globs,
      },
    };

    let settings = Self {
      root,
      env,
      promote,
      strict: overrides.strict.or(file.strict).unwrap_or(false),
      watch,
    };
    debug!(root = %settings.root.display(), env = %settings.env, promote = ?settings.promote, "resolved settings");
    Ok(settings)
  }

  pub fn policy(&self) -> OrderPolicy {
    OrderPolicy::new(self.promote.clone())
  }

  pub fn pipeline_options(&self) -> PipelineOptions {
    PipelineOptions {
      root: self.root.clone(),
      env: self.env.clone(),
      policy: self.policy(),
      strict: self.strict,
    }
  }
}
