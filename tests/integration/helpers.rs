//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Variables the CI environment would set; cleared so the host cannot leak in
const CI_VARS: &[&str] = &[
  "GITHUB_EVENT_NAME",
  "GITHUB_SHA",
  "GITHUB_ACTOR",
  "GITHUB_EVENT_PATH",
  "GITHUB_TOKEN",
  "RUST_LOG",
];

/// A test workspace: git repo with a Dockerfile and a fake container engine
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  engine_log: PathBuf,
}

impl TestWorkspace {
  /// Create a workspace whose pipeline.toml points at the fake engine
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("repo");
    std::fs::create_dir_all(&path)?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(path.join("Dockerfile"), "FROM scratch\n")?;

    let engine_log = root.path().join("engine.log");
    let engine = root.path().join("fake-engine");
    std::fs::write(
      &engine,
      format!(
        r#"#!/bin/sh
echo "$*" >> "{log}"
if [ "$1" = "login" ]; then
  cat > "{log}.stdin"
fi
if [ "$1" = "$FAKE_ENGINE_FAIL" ]; then
  exit 1
fi
exit 0
"#,
        log = engine_log.display()
      ),
    )?;
    std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755))?;

    std::fs::write(
      path.join("pipeline.toml"),
      format!("[image]\nengine = \"{}\"\n", engine.display()),
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial commit"])?;

    Ok(Self {
      _root: root,
      path,
      engine_log,
    })
  }

  /// Engine invocations recorded so far, one line of arguments each
  pub fn engine_calls(&self) -> Vec<String> {
    std::fs::read_to_string(&self.engine_log)
      .map(|log| log.lines().map(String::from).collect())
      .unwrap_or_default()
  }

  /// What the fake engine read on stdin during `login`
  pub fn login_stdin(&self) -> Option<String> {
    std::fs::read_to_string(self.engine_log.with_extension("log.stdin")).ok()
  }

  /// Write a GitHub event payload and return its path
  pub fn write_event(&self, payload: &str) -> Result<PathBuf> {
    let event_path = self.path.join("event.json");
    std::fs::write(&event_path, payload)?;
    Ok(event_path)
  }

  /// HEAD commit id
  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the image-pipeline binary with a clean CI environment plus `envs`
///
/// Returns the output whatever the exit status; tests assert on it.
pub fn run_image_pipeline(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_image-pipeline");

  let mut cmd = Command::new(bin);
  cmd.current_dir(cwd).args(args);
  for var in CI_VARS {
    cmd.env_remove(var);
  }
  cmd.env_remove("FAKE_ENGINE_FAIL");
  cmd.envs(envs.iter().copied());

  cmd.output().context("Failed to run image-pipeline")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
