//! `mbuild clean` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

fn built_tree() -> TestEnv {
  let env = TestEnv::new();
  env.package("api", "");
  env.package("web", "");
  env.mbuild_cmd().arg("build").assert().success();
  env
}

#[test]
fn clean_removes_every_local_module() {
  let env = built_tree();

  env
    .mbuild_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed"));

  assert!(!env.root().join("api/.mbuild/local.config.json").exists());
  assert!(!env.root().join("web/.mbuild/local.config.json").exists());
  assert!(env.root().join(".mbuild/global.config.json").exists());
}

#[test]
fn clean_single_package() {
  let env = built_tree();

  env.mbuild_cmd().arg("clean").arg("web").assert().success();

  assert!(env.root().join("api/.mbuild/local.config.json").exists());
  assert!(!env.root().join("web/.mbuild/local.config.json").exists());
}

#[test]
fn clean_twice_has_nothing_to_do() {
  let env = built_tree();

  env.mbuild_cmd().arg("clean").assert().success();
  env
    .mbuild_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to clean"));
}

#[test]
fn clean_unknown_package_fails() {
  let env = built_tree();

  env
    .mbuild_cmd()
    .arg("clean")
    .arg("missing")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unknown package: missing"));
}
