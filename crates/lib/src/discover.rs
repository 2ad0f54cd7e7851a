//! Package discovery.
//!
//! A package is an immediate child directory of the root that contains the
//! descriptor file (`configure.lua`). Discovery returns package names in
//! lexicographic order, except that names listed in the [`OrderPolicy`] are
//! promoted to the front.

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_PROMOTED_PACKAGE, DESCRIPTOR_FILE};
use crate::fs::FileSystem;

/// Filter value matching every package.
pub const MATCH_ALL: &str = "*";

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoverError {
  #[error("failed to scan {}: {source}", root.display())]
  Walk { root: PathBuf, source: io::Error },
}

/// Explicit build-order override.
///
/// Packages named in `promote` are moved to the front of the discovered list,
/// in the order they appear in `promote`. All other packages keep
/// lexicographic order. The default promotes `lbclient`, which other packages
/// implicitly expect to be built first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPolicy {
  promote: Vec<String>,
}

impl Default for OrderPolicy {
  fn default() -> Self {
    Self::new(vec![DEFAULT_PROMOTED_PACKAGE.to_string()])
  }
}

impl OrderPolicy {
  pub fn new(promote: Vec<String>) -> Self {
    Self { promote }
  }

  /// Purely lexicographic ordering.
  pub fn lexicographic() -> Self {
    Self::new(Vec::new())
  }

  fn rank(&self, name: &str) -> Option<usize> {
    self.promote.iter().position(|p| p == name)
  }

  /// Compare two package names under this policy.
  pub fn compare(&self, a: &str, b: &str) -> Ordering {
    match (self.rank(a), self.rank(b)) {
      (Some(x), Some(y)) => x.cmp(&y),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => a.cmp(b),
    }
  }

  /// Sort names in place and drop duplicates.
  pub fn sort(&self, names: &mut Vec<String>) {
    names.sort_by(|a, b| self.compare(a, b));
    names.dedup();
  }
}

/// Scan `root` and return the ordered list of package names.
///
/// Only descriptor files exactly two levels below `root`
/// (`root/<package>/configure.lua`) qualify.
pub fn list_packages<F: FileSystem + ?Sized>(
  fs: &F,
  root: &Path,
  policy: &OrderPolicy,
) -> Result<Vec<String>, DiscoverError> {
  let entries = fs.walk(root, 2).map_err(|source| DiscoverError::Walk {
    root: root.to_path_buf(),
    source,
  })?;

  let mut names: Vec<String> = entries
    .iter()
    .filter(|path| path.file_name().is_some_and(|name| name == DESCRIPTOR_FILE))
    .filter_map(|path| {
      let package_dir = path.parent()?;
      if package_dir == root || package_dir.parent()? != root {
        return None;
      }
      Some(package_dir.file_name()?.to_string_lossy().into_owned())
    })
    .collect();

  policy.sort(&mut names);
  debug!(root = %root.display(), packages = ?names, "scanned for packages");
  Ok(names)
}

/// Memoized discovery for a single pipeline run.
///
/// The first call to [`PackageIndex::packages`] scans the tree; later calls
/// return the cached list. A new run must create a new index.
pub struct PackageIndex<'a, F: FileSystem + ?Sized> {
  fs: &'a F,
  root: PathBuf,
  policy: OrderPolicy,
  cache: Option<Vec<String>>,
}

impl<'a, F: FileSystem + ?Sized> PackageIndex<'a, F> {
  pub fn new(fs: &'a F, root: impl Into<PathBuf>, policy: OrderPolicy) -> Self {
    Self {
      fs,
      root: root.into(),
      policy,
      cache: None,
    }
  }

  /// All discovered packages, scanning on first use.
  pub fn packages(&mut self) -> Result<&[String], DiscoverError> {
    let packages = match self.cache.take() {
      Some(cached) => cached,
      None => list_packages(self.fs, &self.root, &self.policy)?,
    };
    Ok(self.cache.insert(packages))
  }

  /// Select packages by name.
  ///
  /// `"*"` and `""` return every package; any other filter returns the exact
  /// match, or nothing.
  pub fn find_packages(&mut self, filter: &str) -> Result<Vec<String>, DiscoverError> {
    let match_all = filter.is_empty() || filter == MATCH_ALL;
    Ok(
      self
        .packages()?
        .iter()
        .filter(|name| match_all || name.as_str() == filter)
        .cloned()
        .collect(),
    )
  }
}
