//! Helper tables exposed to package scripts under the `mbuild` global.

pub mod path;
