//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated package tree.
///
/// Each test gets its own temporary root; packages are its immediate children.
pub struct TestEnv {
  _temp: TempDir,
  root: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    Self { _temp: temp, root }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Write a file relative to the root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.root.join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Create a package whose `configure.lua` contains `script`.
  pub fn package(&self, name: &str, script: &str) {
    self.write_file(&format!("{}/configure.lua", name), script);
  }

  /// Read a generated config module as JSON.
  pub fn module(&self, relative_path: &str) -> serde_json::Value {
    let content = std::fs::read_to_string(self.root.join(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read module {}: {}", relative_path, e));
    serde_json::from_str(&content).unwrap()
  }

  /// Get a pre-configured Command for the mbuild binary.
  ///
  /// Runs against this root with `MBUILD_ENV` and `RUST_LOG` cleared.
  pub fn mbuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("mbuild");
    cmd.env_remove("MBUILD_ENV");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--root").arg(&self.root);
    cmd
  }
}
