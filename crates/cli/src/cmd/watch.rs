//! Implementation of the `mbuild watch` command.

use std::ops::ControlFlow;

use anyhow::{Context, Result};

use mbuild_lib::settings::Settings;
use mbuild_lib::watch::watch_and_rebuild;

use super::build::print_report;
use crate::output::{print_error, print_info};

pub fn cmd_watch(settings: &Settings) -> Result<()> {
  print_info(&format!("Watching {} (env: {})", settings.root.display(), settings.env));

  watch_and_rebuild(settings, |outcome| {
    match outcome {
      Ok(report) => print_report(report),
      Err(e) => print_error(&format!("Run failed: {}", e)),
    }
    println!();
    print_info("Waiting for changes...");
    ControlFlow::Continue(())
  })
  .context("Watch failed")
}
