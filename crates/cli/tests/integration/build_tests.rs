//! `mbuild build` integration tests.

use predicates::prelude::*;
use serde_json::json;

use super::common::TestEnv;

const LBCLIENT: &str = r#"
return {
  global = function(env, global)
    global.client = "lbclient"
    global.env = env
  end,
  build = function(env, global, ctx, done)
    done()
  end,
}
"#;

const WEB: &str = r#"
return {
  ["local"] = function(env, global, ctx)
    ctx.client = global.client
    ctx.dir = mbuild.path.basename(__dir)
  end,
}
"#;

#[test]
fn build_writes_modules_and_reports_packages() {
  let env = TestEnv::new();
  env.package("web", WEB);
  env.package("lbclient", LBCLIENT);

  env
    .mbuild_cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("lbclient"))
    .stdout(predicate::str::contains("Built: 2"));

  let global = env.module(".mbuild/global.config.json");
  assert_eq!(global["export"], json!("GLOBAL_CONFIG"));
  assert_eq!(global["config"]["client"], json!("lbclient"));
  assert_eq!(global["config"]["env"], json!("development"));

  let web = env.module("web/.mbuild/local.config.json");
  assert_eq!(web["export"], json!("LOCAL_CONFIG"));
  assert_eq!(web["config"], json!({ "client": "lbclient", "dir": "web" }));
}

#[test]
fn env_flag_reaches_hooks() {
  let env = TestEnv::new();
  env.package("lbclient", LBCLIENT);

  env.mbuild_cmd().arg("--env").arg("production").arg("build").assert().success();

  assert_eq!(env.module(".mbuild/global.config.json")["config"]["env"], json!("production"));
}

#[test]
fn env_var_and_settings_file_select_env() {
  let env = TestEnv::new();
  env.package("lbclient", LBCLIENT);
  env.write_file("mbuild.toml", "env = \"staging\"\n");

  env.mbuild_cmd().arg("build").assert().success();
  assert_eq!(env.module(".mbuild/global.config.json")["config"]["env"], json!("staging"));

  env.mbuild_cmd().env("MBUILD_ENV", "qa").arg("build").assert().success();
  assert_eq!(env.module(".mbuild/global.config.json")["config"]["env"], json!("qa"));
}

#[test]
fn build_failure_stops_later_packages() {
  let env = TestEnv::new();
  env.package("a", "return { build = function(env, g, ctx, done) done() end }");
  env.package("b", r#"return { build = function(env, g, ctx, done) done("compile error") end }"#);
  env.package("c", r#"return { build = function() error("c must not build") end }"#);

  env
    .mbuild_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("compile error"))
    .stderr(predicate::str::contains("c must not build").not())
    .stdout(predicate::str::contains("Skipped: 1"));
}

#[test]
fn configure_errors_are_reported_but_do_not_fail() {
  let env = TestEnv::new();
  env.package("a", r#"return { global = function() error("bad global") end }"#);
  env.package("b", "return { global = function(env, global) global.b = true end }");

  env
    .mbuild_cmd()
    .arg("build")
    .assert()
    .success()
    .stderr(predicate::str::contains("bad global"));

  assert_eq!(env.module(".mbuild/global.config.json")["config"]["b"], json!(true));
}

#[test]
fn strict_flag_fails_on_configure_errors() {
  let env = TestEnv::new();
  env.package("a", r#"return { ["local"] = function(env, g, l, done) done("bad local") end }"#);

  env.mbuild_cmd().arg("--strict").arg("build").assert().failure();
}

#[test]
fn json_format_reports_outcome() {
  let env = TestEnv::new();
  env.package("web", WEB);
  env.package("lbclient", LBCLIENT);

  let output = env.mbuild_cmd().arg("build").arg("--format").arg("json").output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["success"], json!(true));
  assert_eq!(report["packages"], json!(["lbclient", "web"]));
  assert_eq!(report["built"], json!(["lbclient", "web"]));
  assert_eq!(report["failed"], json!(null));
}

#[test]
fn invalid_script_fails_the_build() {
  let env = TestEnv::new();
  env.package("broken", "return {");

  env
    .mbuild_cmd()
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn build_hook_runs_commands_in_package_dir() {
  if cfg!(windows) {
    return;
  }

  let env = TestEnv::new();
  env.package(
    "web",
    r#"return { build = function() mbuild.exec("echo " .. mbuild.env .. " > built.txt") end }"#,
  );

  env.mbuild_cmd().arg("build").assert().success();

  let built = std::fs::read_to_string(env.root().join("web/built.txt")).unwrap();
  assert_eq!(built.trim(), "development");
}
