//! Conversion between configuration objects and Lua tables.
//!
//! Tables whose keys are exactly `1..=n` become JSON arrays; all other tables,
//! including mixed and sparse ones, become objects with stringified keys. Values JSON cannot hold (functions,
//! userdata, threads) are dropped, as are `nil`s.

use mlua::prelude::*;
use serde_json::{Map, Number, Value};

use crate::config::ConfigObject;

/// Deepest table nesting accepted when reading a config object back from Lua.
const MAX_DEPTH: usize = 64;

/// Build a Lua table from a configuration object.
pub fn object_to_table(lua: &Lua, object: &ConfigObject) -> LuaResult<LuaTable> {
  let table = lua.create_table()?;
  for (key, value) in object {
    table.set(key.as_str(), json_to_lua(lua, value)?)?;
  }
  Ok(table)
}

/// Read a configuration object back from a Lua table.
pub fn table_to_object(table: &LuaTable) -> LuaResult<ConfigObject> {
  match table_to_json(table, 0)? {
    Value::Object(map) => Ok(map),
    // A table used as a sequence at the top level keeps its entries under
    // their 1-based indices.
    Value::Array(items) => Ok(
      items
        .into_iter()
        .enumerate()
        .map(|(i, v)| ((i + 1).to_string(), v))
        .collect(),
    ),
    _ => Ok(Map::new()),
  }
}

pub fn json_to_lua(lua: &Lua, value: &Value) -> LuaResult<LuaValue> {
  match value {
    Value::Null => Ok(LuaValue::Nil),
    Value::Bool(b) => Ok(LuaValue::Boolean(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => Ok(LuaValue::Integer(i)),
      None => Ok(LuaValue::Number(n.as_f64().unwrap_or(f64::NAN))),
    },
    Value::String(s) => Ok(LuaValue::String(lua.create_string(s)?)),
    Value::Array(items) => {
      let table = lua.create_table()?;
      for (i, item) in items.iter().enumerate() {
        table.raw_set(i + 1, json_to_lua(lua, item)?)?;
      }
      Ok(LuaValue::Table(table))
    }
    Value::Object(map) => Ok(LuaValue::Table(object_to_table(lua, map)?)),
  }
}

/// Convert a Lua value at `depth`, returning `None` for values JSON cannot represent.
fn value_to_json(value: &LuaValue, depth: usize) -> LuaResult<Option<Value>> {
  match value {
    LuaValue::Nil => Ok(None),
    LuaValue::Boolean(b) => Ok(Some(Value::Bool(*b))),
    LuaValue::Integer(i) => Ok(Some(Value::from(*i))),
    LuaValue::Number(n) => Ok(Some(Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null))),
    LuaValue::String(s) => Ok(Some(Value::String(s.to_str()?.to_string()))),
    LuaValue::Table(t) => table_to_json(t, depth + 1).map(Some),
    _ => Ok(None),
  }
}

fn table_to_json(table: &LuaTable, depth: usize) -> LuaResult<Value> {
  if depth > MAX_DEPTH {
    return Err(LuaError::external("config nesting is too deep (cyclic table?)"));
  }

  if let Some(len) = sequence_len(table)? {
    let mut items = Vec::with_capacity(len);
    for i in 1..=len {
      let item: LuaValue = table.raw_get(i)?;
      items.push(value_to_json(&item, depth)?.unwrap_or(Value::Null));
    }
    return Ok(Value::Array(items));
  }

  let mut map = Map::new();
  for pair in table.pairs::<LuaValue, LuaValue>() {
    let (key, value) = pair?;
    let key = match key {
      LuaValue::String(s) => s.to_str()?.to_string(),
      LuaValue::Integer(i) => i.to_string(),
      LuaValue::Number(n) => n.to_string(),
      LuaValue::Boolean(b) => b.to_string(),
      _ => continue,
    };
    if let Some(value) = value_to_json(&value, depth)? {
      map.insert(key, value);
    }
  }
  Ok(Value::Object(map))
}

/// Length of `table` if its keys are exactly `1..=len` with `len > 0`.
fn sequence_len(table: &LuaTable) -> LuaResult<Option<usize>> {
  let len = table.raw_len();
  if len == 0 {
    return Ok(None);
  }

  let mut count = 0;
  for pair in table.pairs::<LuaValue, LuaValue>() {
    match pair?.0 {
      LuaValue::Integer(i) if i >= 1 && (i as usize) <= len => count += 1,
      _ => return Ok(None),
    }
  }
  Ok((count == len).then_some(len))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn object_survives_a_trip_through_lua() -> LuaResult<()> {
    let lua = Lua::new();
    let object = json!({
      "port": 8080,
      "ratio": 1.5,
      "name": "web",
      "flags": [true, false],
      "nested": { "deep": { "list": ["a", "b"] } }
    })
    .as_object()
    .cloned()
    .unwrap();

    let table = object_to_table(&lua, &object)?;
    assert_eq!(table_to_object(&table)?, object);
    Ok(())
  }

  #[test]
  fn lua_side_values_are_mapped() -> LuaResult<()> {
    let lua = Lua::new();
    let table: LuaTable = lua
      .load(
        r#"
          return {
            count = 3,
            half = 0.5,
            list = { 1, 2, 3 },
            empty = {},
            fn = function() end,
            [10] = "ten",
          }
        "#,
      )
      .eval()?;

    let object = table_to_object(&table)?;
    assert_eq!(object.get("count"), Some(&json!(3)));
    assert_eq!(object.get("half"), Some(&json!(0.5)));
    assert_eq!(object.get("list"), Some(&json!([1, 2, 3])));
    assert_eq!(object.get("empty"), Some(&json!({})));
    assert_eq!(object.get("10"), Some(&json!("ten")));
    assert!(!object.contains_key("fn"));
    Ok(())
  }

  #[test]
  fn mixed_tables_keep_every_entry() -> LuaResult<()> {
    let lua = Lua::new();
    let table: LuaTable = lua.load(r#"return { opts = { "first", mode = "fast" } }"#).eval()?;

    let object = table_to_object(&table)?;
    assert_eq!(object.get("opts"), Some(&json!({ "1": "first", "mode": "fast" })));
    Ok(())
  }

  #[test]
  fn sparse_tables_keep_every_entry() -> LuaResult<()> {
    let lua = Lua::new();
    let table: LuaTable = lua.load(r#"return { slots = { [1] = "x", [3] = "y" } }"#).eval()?;

    let object = table_to_object(&table)?;
    assert_eq!(object.get("slots"), Some(&json!({ "1": "x", "3": "y" })));
    Ok(())
  }

  #[test]
  fn cyclic_tables_are_rejected() -> LuaResult<()> {
    let lua = Lua::new();
    let table: LuaTable = lua.load("local t = {}; t.self = t; return t").eval()?;
    assert!(table_to_object(&table).is_err());
    Ok(())
  }
}
