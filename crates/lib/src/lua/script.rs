//! Lua package scripts.
//!
//! A package's `configure.lua` returns a table whose optional `global`,
//! `local` and `build` fields are hooks:
//!
//! ```lua
//! return {
//!   global = function(env, global, ctx, done) global.api_url = "/api" end,
//!   build = function(env, global, ctx, done)
//!     mbuild.exec("make")
//!     done()
//!   end,
//! }
//! ```
//!
//! A hook succeeds when it returns, unless it raised an error or called
//! `done` with an argument other than `nil` or `false`.
//!
//! Every hook of a run sees the same live `global` table, and every hook of a
//! package the same `ctx` table, so references captured by one hook observe
//! later mutations made by another.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::convert::{object_to_table, table_to_object};
use super::globals::PACKAGE_DIR_KEY;
use super::{loaders, runtime};
use crate::config::{ConfigObject, HookArgs, HookError, PackageScript, Scope, ScriptLoader};
use crate::consts::DESCRIPTOR_FILE;

/// Errors creating the Lua host.
#[derive(Debug, Error)]
pub enum ScriptError {
  #[error("failed to create lua runtime: {0}")]
  Runtime(String),
}

/// Live config tables of one run.
///
/// Each table is seeded from the store the first time a hook needs it and is
/// the source of truth from then on; the store mirrors it after every hook.
#[derive(Debug, Default)]
struct ConfigTables {
  global: RefCell<Option<LuaTable>>,
  locals: RefCell<HashMap<String, LuaTable>>,
}

impl ConfigTables {
  fn global(&self, lua: &Lua, seed: &ConfigObject) -> LuaResult<LuaTable> {
    if let Some(table) = self.global.borrow().as_ref() {
      return Ok(table.clone());
    }
    let table = object_to_table(lua, seed)?;
    *self.global.borrow_mut() = Some(table.clone());
    Ok(table)
  }

  fn local(&self, lua: &Lua, package: &str, seed: &ConfigObject) -> LuaResult<LuaTable> {
    if let Some(table) = self.locals.borrow().get(package) {
      return Ok(table.clone());
    }
    let table = object_to_table(lua, seed)?;
    self.locals.borrow_mut().insert(package.to_string(), table.clone());
    Ok(table)
  }
}

/// Loads `configure.lua` scripts into one Lua runtime for the whole run.
///
/// Each script is evaluated at most once per loader; later lookups return the
/// cached result.
pub struct LuaScriptLoader {
  lua: Lua,
  root: PathBuf,
  scripts: RefCell<HashMap<String, Option<Rc<LuaScript>>>>,
  tables: Rc<ConfigTables>,
}

impl LuaScriptLoader {
  pub fn new(root: &Path, env: &str) -> Result<Self, ScriptError> {
    let lua = runtime::create_runtime(root, env).map_err(|e| ScriptError::Runtime(e.to_string()))?;
    Ok(Self {
      lua,
      root: root.to_path_buf(),
      scripts: RefCell::new(HashMap::new()),
      tables: Rc::new(ConfigTables::default()),
    })
  }

  fn evaluate(&self, package: &str) -> Result<Option<Rc<LuaScript>>, HookError> {
    let dir = self.root.join(package);
    let path = dir.join(DESCRIPTOR_FILE);
    if !path.is_file() {
      return Ok(None);
    }

    let load_error = |message: String| HookError::Load {
      path: path.clone(),
      message,
    };

    match loaders::load_file_with_dir(&self.lua, &path).map_err(|e| load_error(e.to_string()))? {
      LuaValue::Table(table) => Ok(Some(Rc::new(LuaScript {
        lua: self.lua.clone(),
        table,
        dir,
        tables: self.tables.clone(),
      }))),
      LuaValue::Nil => {
        debug!(package = %package, "script returned nothing, no hooks");
        Ok(None)
      }
      other => Err(load_error(format!(
        "{} must return a table of hooks, got {}",
        DESCRIPTOR_FILE,
        other.type_name()
      ))),
    }
  }
}

impl ScriptLoader for LuaScriptLoader {
  type Script = LuaScript;

  fn load(&self, package: &str) -> Result<Option<Rc<LuaScript>>, HookError> {
    if let Some(cached) = self.scripts.borrow().get(package) {
      return Ok(cached.clone());
    }

    let script = self.evaluate(package)?;
    self.scripts.borrow_mut().insert(package.to_string(), script.clone());
    Ok(script)
  }
}

/// A package's evaluated `configure.lua`.
#[derive(Debug)]
pub struct LuaScript {
  lua: Lua,
  table: LuaTable,
  dir: PathBuf,
  tables: Rc<ConfigTables>,
}

impl LuaScript {
  fn hook(&self, scope: Scope) -> Option<LuaFunction> {
    match self.table.get::<LuaValue>(scope.as_str()) {
      Ok(LuaValue::Function(f)) => Some(f),
      _ => None,
    }
  }
}

impl PackageScript for LuaScript {
  fn supports(&self, scope: Scope) -> bool {
    self.hook(scope).is_some()
  }

  async fn invoke(&self, scope: Scope, args: HookArgs<'_>) -> Result<(), HookError> {
    let Some(hook) = self.hook(scope) else {
      return Ok(());
    };

    let raised = |e: LuaError| HookError::Raised {
      scope,
      message: e.to_string(),
    };
    let invalid = |e: LuaError| HookError::InvalidConfig {
      scope,
      message: e.to_string(),
    };

    let global = self.tables.global(&self.lua, args.global).map_err(raised)?;
    let local = self.tables.local(&self.lua, args.package, args.local).map_err(raised)?;

    let reported: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let slot = reported.clone();
    let done = self
      .lua
      .create_function(move |_, err: LuaValue| {
        if !matches!(err, LuaValue::Nil | LuaValue::Boolean(false)) {
          let message = err.to_string().unwrap_or_else(|_| err.type_name().to_string());
          slot.borrow_mut().get_or_insert(message);
        }
        Ok(())
      })
      .map_err(raised)?;

    self
      .lua
      .set_named_registry_value(PACKAGE_DIR_KEY, self.dir.to_string_lossy().into_owned())
      .map_err(raised)?;

    let outcome = hook
      .call_async::<()>((args.env, global.clone(), local.clone(), done))
      .await;

    let _ = self.lua.set_named_registry_value(PACKAGE_DIR_KEY, LuaValue::Nil);

    // Mutations made before a failure still count.
    *args.global = table_to_object(&global).map_err(invalid)?;
    *args.local = table_to_object(&local).map_err(invalid)?;

    outcome.map_err(raised)?;
    if let Some(message) = reported.borrow_mut().take() {
      return Err(HookError::Reported { scope, message });
    }
    Ok(())
  }
}
