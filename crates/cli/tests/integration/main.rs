//! CLI integration tests.

mod build_tests;
mod clean_tests;
mod common;
mod list_tests;
