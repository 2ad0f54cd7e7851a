//! Script loading with per-file `__dir` injection.
//!
//! Every package script, and every file it pulls in through `require` or
//! `dofile`, runs in its own environment table containing `__dir` (the
//! directory of that file) and falling back to `_G` for everything else.
//! `dofile` resolves relative paths against the calling file's `__dir`, or
//! against the package directory when called from a running hook.

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;

use super::globals::PACKAGE_DIR_KEY;

/// Registry key holding the `__dir` of the file currently being loaded.
const CURRENT_DIR_KEY: &str = "__mbuild_current_dir";

/// Build the environment table for a file living in `dir`.
fn file_env(lua: &Lua, dir: &str) -> LuaResult<LuaTable> {
  let env = lua.create_table()?;
  env.set("__dir", dir)?;

  let mt = lua.create_table()?;
  mt.set("__index", lua.globals())?;
  mt.set("__newindex", lua.globals())?;
  env.set_metatable(Some(mt))?;
  Ok(env)
}

/// Load and evaluate the Lua file at `path` with `__dir` set to its directory.
pub fn load_file_with_dir(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let canonical = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot resolve '{}': {}", path.display(), e)))?;
  let content = fs::read_to_string(&canonical)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", canonical.display(), e)))?;
  let dir = canonical
    .parent()
    .unwrap_or(Path::new("."))
    .to_string_lossy()
    .into_owned();

  let prev_dir: Option<String> = lua.named_registry_value(CURRENT_DIR_KEY)?;
  lua.set_named_registry_value(CURRENT_DIR_KEY, dir.as_str())?;

  let result = file_env(lua, &dir).and_then(|env| {
    lua
      .load(&content)
      .set_name(format!("@{}", canonical.display()))
      .set_environment(env)
      .eval::<LuaValue>()
  });

  // Restore even on failure; the load error is the one worth reporting.
  let _ = lua.set_named_registry_value(CURRENT_DIR_KEY, prev_dir);
  result
}

/// Resolve `path_str` against the `__dir` of the file being loaded, if relative.
///
/// Outside of a load (hooks run after their script has been evaluated) the
/// directory of the package whose hook is running is used instead.
fn resolve_path(lua: &Lua, path_str: &str) -> LuaResult<PathBuf> {
  let path = Path::new(path_str);
  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }

  let current: Option<String> = match lua.named_registry_value(CURRENT_DIR_KEY)? {
    Some(dir) => Some(dir),
    None => lua.named_registry_value(PACKAGE_DIR_KEY)?,
  };
  if let Some(dir) = current {
    let resolved = Path::new(&dir).join(path);
    if resolved.exists() {
      return Ok(resolved);
    }
  }
  Ok(path.to_path_buf())
}

/// `package.searchers[2]` replacement: finds modules on `package.path` and
/// loads them through [`load_file_with_dir`].
fn create_lua_searcher(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, modname: String| {
    let package: LuaTable = lua.globals().get("package")?;
    let search_path: String = package.get("path")?;
    let searchpath: LuaFunction = package.get("searchpath")?;
    let found: Option<String> = searchpath.call::<LuaMultiValue>((modname.as_str(), search_path))?
      .into_iter()
      .next()
      .and_then(|v| match v {
        LuaValue::String(s) => s.to_str().ok().map(|s| s.to_string()),
        _ => None,
      });

    match found {
      Some(file) => {
        let target = file.clone();
        let loader = lua.create_function(move |lua, _: LuaMultiValue| load_file_with_dir(lua, Path::new(&target)))?;
        Ok((LuaValue::Function(loader), file))
      }
      None => Ok((LuaValue::Nil, format!("\n\tno file for module '{}'", modname))),
    }
  })
}

/// Install `__dir`-aware `require` and `dofile`.
pub fn install_loaders(lua: &Lua) -> LuaResult<()> {
  let package: LuaTable = lua.globals().get("package")?;
  let searchers: LuaTable = package.get("searchers")?;
  searchers.set(2, create_lua_searcher(lua)?)?;

  let dofile = lua.create_function(|lua, path: Option<String>| match path {
    Some(path) => {
      let resolved = resolve_path(lua, &path)?;
      load_file_with_dir(lua, &resolved)
    }
    None => Err(LuaError::external("dofile() without a path is not supported")),
  })?;
  lua.globals().set("dofile", dofile)?;

  Ok(())
}
