//! mbuild-lib: Core logic for mbuild
//!
//! This crate implements the multi-package build pipeline:
//! - `discover`: finds packages (directories holding a `configure.lua`) and orders them
//! - `config`: the global/local configuration store and the hook runner
//! - `lua`: the Lua host that loads package scripts
//! - `module`: generated config modules consumed by package builds
//! - `build`: the sequential build pass
//! - `pipeline`: discover, configure, write modules, build
//! - `watch`: re-runs the pipeline on file changes

pub mod build;
pub mod config;
pub mod consts;
pub mod discover;
pub mod fs;
pub mod lua;
pub mod module;
pub mod pipeline;
pub mod settings;
pub mod watch;

#[cfg(test)]
mod testutil;
