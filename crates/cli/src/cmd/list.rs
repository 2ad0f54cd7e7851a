//! Implementation of the `mbuild list` command.

use anyhow::{Context, Result};
use serde_json::json;

use mbuild_lib::discover::PackageIndex;
use mbuild_lib::fs::OsFileSystem;
use mbuild_lib::settings::Settings;

use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_list(settings: &Settings, filter: &str, format: OutputFormat) -> Result<()> {
  let mut index = PackageIndex::new(&OsFileSystem, &settings.root, settings.policy());
  let packages = index
    .find_packages(filter)
    .with_context(|| format!("Failed to discover packages in {}", settings.root.display()))?;

  if format.is_json() {
    return print_json(&json!({ "root": settings.root, "packages": packages }));
  }

  if packages.is_empty() {
    print_info("No packages found");
  }
  for package in &packages {
    println!("{}", package);
  }
  Ok(())
}
