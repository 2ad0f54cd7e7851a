use std::path::Path;

use mlua::prelude::*;

use crate::lua::{globals, loaders};

/// Create the Lua runtime shared by every package script in a run.
///
/// Shared Lua modules may live in `<root>/lua/`; they are searched before the
/// default `package.path`. The `mbuild` global and `__dir`-aware loaders are
/// installed.
pub fn create_runtime(root: &Path, env: &str) -> LuaResult<Lua> {
  let lua = Lua::new();

  let package = lua.globals().get::<LuaTable>("package")?;
  let default_path = package.get::<String>("path")?;
  let lua_dir = root.join("lua").to_string_lossy().replace('\\', "/");
  package.set("path", format!("{0}/?.lua;{0}/?/init.lua;{1}", lua_dir, default_path))?;

  loaders::install_loaders(&lua)?;
  globals::register_globals(&lua, root, env)?;

  Ok(lua)
}
