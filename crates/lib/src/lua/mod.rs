//! Lua host for package scripts.
//!
//! One Lua runtime is created per pipeline run. Every package's
//! `configure.lua` is evaluated in it, with the `mbuild` global and
//! `__dir`-aware `require`/`dofile` available.
//!
//! # Submodules
//!
//! - [`convert`] - config objects to and from Lua tables
//! - [`exec`] - child processes behind `mbuild.exec`
//! - [`globals`] - the `mbuild` global table
//! - [`helpers`] - helper tables exposed under `mbuild`
//! - [`loaders`] - script loading with `__dir` injection
//! - [`runtime`] - Lua VM creation
//! - [`script`] - [`LuaScriptLoader`], the [`ScriptLoader`](crate::config::ScriptLoader) used by the pipeline

pub mod convert;
pub mod exec;
pub mod globals;
pub mod helpers;
pub mod loaders;
pub mod runtime;
pub mod script;

pub use script::{LuaScript, LuaScriptLoader, ScriptError};
