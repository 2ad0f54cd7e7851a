//! `mbuild list` integration tests.

use predicates::prelude::*;
use serde_json::json;

use super::common::TestEnv;

fn tree() -> TestEnv {
  let env = TestEnv::new();
  for name in ["zeta", "alpha", "lbclient"] {
    env.package(name, "");
  }
  env.write_file("docs/readme.md", "");
  env
}

#[test]
fn lists_packages_in_build_order() {
  let env = tree();

  env
    .mbuild_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout("lbclient\nalpha\nzeta\n");
}

#[test]
fn filter_selects_exact_name() {
  let env = tree();

  env.mbuild_cmd().arg("list").arg("alpha").assert().success().stdout("alpha\n");
  env
    .mbuild_cmd()
    .arg("list")
    .arg("alp")
    .assert()
    .success()
    .stdout(predicate::str::contains("No packages found"));
}

#[test]
fn promote_flag_overrides_order() {
  let env = tree();

  env
    .mbuild_cmd()
    .arg("--promote")
    .arg("zeta,alpha")
    .arg("list")
    .assert()
    .success()
    .stdout("zeta\nalpha\nlbclient\n");
}

#[test]
fn settings_file_can_disable_promotion() {
  let env = tree();
  env.write_file("mbuild.toml", "promote = []\n");

  env
    .mbuild_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout("alpha\nlbclient\nzeta\n");
}

#[test]
fn json_format_lists_packages() {
  let env = tree();

  let output = env.mbuild_cmd().arg("list").arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(listed["packages"], json!(["lbclient", "alpha", "zeta"]));
}
