//! `mbuild.path`: path manipulation for package scripts.

use std::path::{Component, Path, PathBuf};

use mlua::prelude::*;

fn lossy(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

/// Relative path from `from` to `to`, computed lexically.
fn relative(from: &Path, to: &Path) -> PathBuf {
  let from: Vec<Component> = from.components().collect();
  let to: Vec<Component> = to.components().collect();
  let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

  let mut out = PathBuf::new();
  for _ in common..from.len() {
    out.push("..");
  }
  for component in &to[common..] {
    out.push(component);
  }
  if out.as_os_str().is_empty() {
    out.push(".");
  }
  out
}

/// Create the `mbuild.path` table.
pub fn create_path_helpers(lua: &Lua) -> LuaResult<LuaTable> {
  let path = lua.create_table()?;

  path.set(
    "join",
    lua.create_function(|_, segments: LuaVariadic<String>| {
      let joined: PathBuf = segments.iter().collect();
      Ok(lossy(&joined))
    })?,
  )?;

  path.set(
    "dirname",
    lua.create_function(|_, p: String| Ok(Path::new(&p).parent().map(lossy).unwrap_or_default()))?,
  )?;

  path.set(
    "basename",
    lua.create_function(|_, p: String| {
      Ok(
        Path::new(&p)
          .file_name()
          .map(|n| n.to_string_lossy().into_owned())
          .unwrap_or_default(),
      )
    })?,
  )?;

  path.set(
    "relative",
    lua.create_function(|_, (from, to): (String, String)| Ok(lossy(&relative(Path::new(&from), Path::new(&to)))))?,
  )?;

  Ok(path)
}
