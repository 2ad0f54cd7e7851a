//! Child process execution for `mbuild.exec`.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use crate::consts::ENV_VAR;

#[derive(Debug, Error)]
pub enum ExecError {
  #[error("failed to spawn `{cmd}`: {source}")]
  Spawn { cmd: String, source: io::Error },

  #[error("command failed with exit code {code:?}: {cmd}{}", stderr_suffix(.stderr))]
  Failed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },
}

fn stderr_suffix(stderr: &str) -> String {
  let stderr = stderr.trim();
  if stderr.is_empty() {
    String::new()
  } else {
    format!("\n{}", stderr)
  }
}

/// Run `cmd` through the platform shell in `cwd`.
///
/// The child inherits the current environment plus `MBUILD_ENV` and any
/// `env` overrides. Returns trimmed stdout on success.
pub async fn run_command(
  cmd: &str,
  cwd: &Path,
  env_name: &str,
  env: &BTreeMap<String, String>,
) -> Result<String, ExecError> {
  info!(cmd = %cmd, cwd = %cwd.display(), "executing command");

  let (shell, shell_args) = shell();
  let mut command = Command::new(shell);
  command
    .args(shell_args)
    .arg(cmd)
    .current_dir(cwd)
    .env(ENV_VAR, env_name)
    .envs(env)
    .kill_on_drop(true);

  let output = command.output().await.map_err(|source| ExecError::Spawn {
    cmd: cmd.to_string(),
    source,
  })?;

  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }
    return Err(ExecError::Failed {
      cmd: cmd.to_string(),
      code: output.status.code(),
      stderr,
    });
  }

  if !stdout.is_empty() {
    debug!(stdout = %stdout, "command output");
  }
  Ok(stdout)
}

#[cfg(unix)]
fn shell() -> (&'static str, &'static [&'static str]) {
  ("/bin/sh", &["-c"])
}

#[cfg(windows)]
fn shell() -> (&'static str, &'static [&'static str]) {
  ("cmd.exe", &["/C"])
}
