//! Implementation of the `mbuild clean` command.
//!
//! Removes the generated `local.config.json` of every package, or of a single
//! package. The global module is left in place.

use anyhow::{Context, Result, bail};

use mbuild_lib::discover::{MATCH_ALL, PackageIndex};
use mbuild_lib::fs::OsFileSystem;
use mbuild_lib::module::{local_module_path, remove_config_module};
use mbuild_lib::settings::Settings;

use crate::output::{print_info, print_success};

pub fn cmd_clean(settings: &Settings, package: Option<&str>) -> Result<()> {
  let mut index = PackageIndex::new(&OsFileSystem, &settings.root, settings.policy());
  let packages = index
    .find_packages(package.unwrap_or(MATCH_ALL))
    .with_context(|| format!("Failed to discover packages in {}", settings.root.display()))?;

  if let Some(name) = package
    && packages.is_empty()
  {
    bail!("Unknown package: {}", name);
  }

  let mut removed = 0;
  for package in &packages {
    if remove_config_module(&OsFileSystem, &settings.root, package)? {
      let path = local_module_path(&settings.root, package);
      print_success(&format!("Removed {}", path.display()));
      removed += 1;
    }
  }

  if removed == 0 {
    print_info("Nothing to clean");
  }
  Ok(())
}
