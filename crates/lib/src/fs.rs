//! File-system capability.
//!
//! Discovery and the config module writer only touch the disk through the
//! [`FileSystem`] trait so tests can observe or replace every access.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// The small set of file operations the pipeline needs.
pub trait FileSystem {
  /// List every entry reachable from `root` (including `root` itself), descending
  /// at most `max_depth` levels.
  fn walk(&self, root: &Path, max_depth: usize) -> io::Result<Vec<PathBuf>>;

  /// Create a directory and all missing parents. Succeeds if it already exists.
  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  /// Replace the contents of `path` with `contents` in a single write.
  fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

  /// Read a whole file as UTF-8.
  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  /// Remove a single file.
  fn remove_file(&self, path: &Path) -> io::Result<()>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
  fn walk(&self, root: &Path, max_depth: usize) -> io::Result<Vec<PathBuf>> {
    (**self).walk(root, max_depth)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    (**self).create_dir_all(path)
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    (**self).write(path, contents)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    (**self).read_to_string(path)
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    (**self).remove_file(path)
  }
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn walk(&self, root: &Path, max_depth: usize) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).max_depth(max_depth).follow_links(false) {
      let entry = entry.map_err(io::Error::from)?;
      entries.push(entry.into_path());
    }
    Ok(entries)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    fs::remove_file(path)
  }
}
