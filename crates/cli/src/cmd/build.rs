//! Implementation of the `mbuild build` command.
//!
//! Runs the pipeline once: discover packages, run their `global` and `local`
//! hooks, write config modules, then build each package in order.

use anyhow::{Context, Result, bail};
use serde_json::json;
use tracing::info;

use mbuild_lib::module::global_module_path;
use mbuild_lib::pipeline::{Pipeline, PipelineReport};
use mbuild_lib::settings::Settings;

use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_skipped, print_stat, print_success,
  print_warning,
};

pub fn cmd_build(settings: &Settings, format: OutputFormat) -> Result<()> {
  let pipeline = Pipeline::new(settings.pipeline_options());
  let report = pipeline.run_blocking().context("Build failed")?;
  info!(path = %global_module_path(&settings.root).display(), "global config module written");

  if format.is_json() {
    print_json(&report_json(&report))?;
  } else {
    print_report(&report);
  }

  if !report.is_success() {
    bail!("Build failed");
  }
  Ok(())
}

/// Print per-package outcomes and a summary.
pub fn print_report(report: &PipelineReport) {
  if report.packages.is_empty() {
    print_info("No packages found");
  }

  for failure in &report.configure_errors {
    print_warning(&format!("{} ({}): {}", failure.package, failure.scope, failure.error));
  }

  for package in &report.build.built {
    print_success(package);
  }
  if let Some((package, err)) = &report.build.build_failed {
    print_error(&format!("{}: {}", package, err));
  }
  for package in &report.build.build_skipped {
    print_skipped(package);
  }

  println!();
  print_stat("Packages", &report.packages.len().to_string());
  print_stat("Built", &report.build.built.len().to_string());
  if !report.build.build_skipped.is_empty() {
    print_stat("Skipped", &report.build.build_skipped.len().to_string());
  }
  if !report.configure_errors.is_empty() {
    print_stat("Configure errors", &report.configure_errors.len().to_string());
  }
  print_stat("Duration", &format_duration(report.duration));
}

fn report_json(report: &PipelineReport) -> serde_json::Value {
  let configure_errors: Vec<_> = report
    .configure_errors
    .iter()
    .map(|f| json!({ "package": f.package, "scope": f.scope, "error": f.error.to_string() }))
    .collect();
  let failed = report
    .build
    .build_failed
    .as_ref()
    .map(|(package, err)| json!({ "package": package, "error": err.to_string() }));

  json!({
    "success": report.is_success(),
    "packages": report.packages,
    "built": report.build.built,
    "failed": failed,
    "skipped": report.build.build_skipped,
    "configure_errors": configure_errors,
    "duration_ms": report.duration.as_millis() as u64,
  })
}
