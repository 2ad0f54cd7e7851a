//! Build execution.
//!
//! A package's build step is its `build` hook, run through the same
//! [`Configurator`](crate::config::Configurator) as the configuration hooks.
//! Packages are built strictly one at a time in discovery order, and the pass
//! stops at the first failure.
//!
//! # Submodules
//!
//! - [`execute`] - the sequential build pass
//! - `types` - [`BuildReport`]

pub mod execute;
mod types;

pub use execute::{build_all, build_package};
pub use types::*;
