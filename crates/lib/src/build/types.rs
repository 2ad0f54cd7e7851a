use crate::config::HookError;

/// Outcome of a build pass.
#[derive(Debug, Default)]
pub struct BuildReport {
  /// Packages built successfully, in order.
  pub built: Vec<String>,

  /// The package that failed and its error (at most one, stops the pass).
  pub build_failed: Option<(String, HookError)>,

  /// Packages never attempted because an earlier package failed.
  pub build_skipped: Vec<String>,
}

impl BuildReport {
  /// Returns true if every package built.
  pub fn is_success(&self) -> bool {
    self.build_failed.is_none()
  }

  /// Number of packages the pass covered, attempted or not.
  pub fn total(&self) -> usize {
    self.built.len() + self.build_failed.iter().count() + self.build_skipped.len()
  }
}
