//! Test utilities for mbuild-lib.
//!
//! Provides temporary package trees, a file system that counts scans, and an
//! in-memory script loader whose hooks are Rust closures.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use crate::config::{HookArgs, HookError, PackageScript, Scope, ScriptLoader};
use crate::consts::DESCRIPTOR_FILE;
use crate::fs::{FileSystem, OsFileSystem};

/// A temporary discovery root.
pub struct PackageTree {
  _temp: TempDir,
  root: PathBuf,
}

impl PackageTree {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    Self { _temp: temp, root }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Write a file relative to the root, creating parent directories.
  pub fn write(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.root.join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Create a package whose descriptor contains `script`.
  pub fn package(&self, name: &str, script: &str) -> PathBuf {
    self.write(&format!("{}/{}", name, DESCRIPTOR_FILE), script);
    self.root.join(name)
  }
}

/// [`OsFileSystem`] wrapper that counts directory scans.
#[derive(Default)]
pub struct CountingFs {
  walks: Cell<usize>,
}

impl CountingFs {
  pub fn walks(&self) -> usize {
    self.walks.get()
  }
}

impl FileSystem for CountingFs {
  fn walk(&self, root: &Path, max_depth: usize) -> io::Result<Vec<PathBuf>> {
    self.walks.set(self.walks.get() + 1);
    OsFileSystem.walk(root, max_depth)
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    OsFileSystem.create_dir_all(path)
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    OsFileSystem.write(path, contents)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    OsFileSystem.read_to_string(path)
  }

  fn remove_file(&self, path: &Path) -> io::Result<()> {
    OsFileSystem.remove_file(path)
  }
}

type Hook = Box<dyn Fn(&mut HookArgs<'_>) -> Result<(), HookError>>;
type CallLog = Rc<RefCell<Vec<(String, Scope)>>>;

/// A package script whose hooks are closures.
#[derive(Default)]
pub struct FakeScript {
  hooks: HashMap<Scope, Hook>,
  calls: CallLog,
}

impl FakeScript {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn on(mut self, scope: Scope, hook: impl Fn(&mut HookArgs<'_>) -> Result<(), HookError> + 'static) -> Self {
    self.hooks.insert(scope, Box::new(hook));
    self
  }
}

impl PackageScript for FakeScript {
  fn supports(&self, scope: Scope) -> bool {
    self.hooks.contains_key(&scope)
  }

  async fn invoke(&self, scope: Scope, mut args: HookArgs<'_>) -> Result<(), HookError> {
    self.calls.borrow_mut().push((args.package.to_string(), scope));
    tokio::task::yield_now().await;
    match self.hooks.get(&scope) {
      Some(hook) => hook(&mut args),
      None => Ok(()),
    }
  }
}

/// In-memory [`ScriptLoader`] recording every hook invocation.
#[derive(Default)]
pub struct FakeLoader {
  scripts: HashMap<String, Rc<FakeScript>>,
  calls: CallLog,
}

impl FakeLoader {
  pub fn with(mut self, package: &str, mut script: FakeScript) -> Self {
    script.calls = self.calls.clone();
    self.scripts.insert(package.to_string(), Rc::new(script));
    self
  }

  /// Hook invocations in the order they happened.
  pub fn calls(&self) -> Vec<(String, Scope)> {
    self.calls.borrow().clone()
  }

  /// Packages whose hook for `scope` ran, in order.
  pub fn calls_for(&self, scope: Scope) -> Vec<String> {
    self
      .calls
      .borrow()
      .iter()
      .filter(|(_, s)| *s == scope)
      .map(|(p, _)| p.clone())
      .collect()
  }
}

impl ScriptLoader for FakeLoader {
  type Script = FakeScript;

  fn load(&self, package: &str) -> Result<Option<Rc<FakeScript>>, HookError> {
    Ok(self.scripts.get(package).cloned())
  }
}

/// Shorthand for a failing hook result.
pub fn fail(scope: Scope, message: &str) -> Result<(), HookError> {
  Err(HookError::Reported {
    scope,
    message: message.to_string(),
  })
}
