//! The `mbuild` global table.
//!
//! - `mbuild.env` - environment name for this run
//! - `mbuild.root` - absolute discovery root
//! - `mbuild.path` - path helpers
//! - `mbuild.exec(cmd, opts?)` - run a shell command, returning its stdout

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mlua::prelude::*;

use super::exec::run_command;
use super::helpers;

/// Registry key holding the directory of the package whose hook is running.
pub const PACKAGE_DIR_KEY: &str = "__mbuild_package_dir";

/// Directory of the package whose hook is currently running, if any.
pub fn current_package_dir(lua: &Lua) -> LuaResult<Option<PathBuf>> {
  let dir: Option<String> = lua.named_registry_value(PACKAGE_DIR_KEY)?;
  Ok(dir.map(PathBuf::from))
}

/// Register the `mbuild` global table.
pub fn register_globals(lua: &Lua, root: &Path, env: &str) -> LuaResult<()> {
  let mbuild = lua.create_table()?;

  mbuild.set("env", env)?;
  mbuild.set("root", root.to_string_lossy().into_owned())?;
  mbuild.set("path", helpers::path::create_path_helpers(lua)?)?;
  mbuild.set("exec", create_exec(lua)?)?;

  lua.globals().set("mbuild", mbuild)?;
  Ok(())
}

/// `mbuild.exec(cmd, { cwd = ..., env = { ... } })`.
///
/// Runs asynchronously, so it may only be called from a hook. A relative `cwd`
/// and the default working directory are both resolved against the running
/// package's directory.
fn create_exec(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_async_function(|lua, (cmd, opts): (String, Option<LuaTable>)| async move {
    let base = match current_package_dir(&lua)? {
      Some(dir) => dir,
      None => std::env::current_dir().map_err(LuaError::external)?,
    };

    let mut cwd = base.clone();
    let mut env = BTreeMap::new();
    if let Some(opts) = opts {
      if let Some(dir) = opts.get::<Option<String>>("cwd")? {
        cwd = base.join(dir);
      }
      if let Some(vars) = opts.get::<Option<LuaTable>>("env")? {
        for pair in vars.pairs::<String, String>() {
          let (key, value) = pair?;
          env.insert(key, value);
        }
      }
    }

    let env_name: String = lua.globals().get::<LuaTable>("mbuild")?.get("env")?;
    run_command(&cmd, &cwd, &env_name, &env)
      .await
      .map_err(LuaError::external)
  })
}
