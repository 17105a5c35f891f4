//! Health check command for diagnosing issues
//!
//! Verifies that the binaries a pipeline run invokes are on PATH and that the
//! configuration loads.

use crate::core::config::PipelineConfig;
use crate::core::engine::ContainerEngine;
use crate::core::error::{PipelineError, PipelineResult};
use crate::core::schedule::CronSchedule;
use serde::Serialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Serialize)]
pub struct CheckResult {
  pub check_name: String,
  pub passed: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub suggestion: Option<String>,
}

impl CheckResult {
  fn pass(name: &str, message: impl Into<String>) -> Self {
    Self {
      check_name: name.to_string(),
      passed: true,
      message: message.into(),
      suggestion: None,
    }
  }

  fn fail(name: &str, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
    Self {
      check_name: name.to_string(),
      passed: false,
      message: message.into(),
      suggestion: Some(suggestion.into()),
    }
  }
}

/// `<program> --version`, first line of stdout
fn probe_version(program: &str) -> Result<String, String> {
  let output = Command::new(program)
    .arg("--version")
    .output()
    .map_err(|e| e.to_string())?;
  if !output.status.success() {
    return Err(format!("exited with {}", output.status));
  }
  Ok(String::from_utf8_lossy(&output.stdout).lines().next().unwrap_or("").trim().to_string())
}

pub fn run_checks(workspace_root: &Path) -> Vec<CheckResult> {
  let mut results = Vec::new();

  let config = match PipelineConfig::load(workspace_root) {
    Ok(config) => {
      let source = PipelineConfig::find_config_path(workspace_root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
      results.push(CheckResult::pass("config", format!("loaded from {}", source)));
      config
    }
    Err(e) => {
      results.push(CheckResult::fail(
        "config",
        e.to_string(),
        e.help_message().unwrap_or_else(|| "Fix pipeline.toml".to_string()),
      ));
      PipelineConfig::default()
    }
  };

  match probe_version("git") {
    Ok(version) => results.push(CheckResult::pass("git", version)),
    Err(e) => results.push(CheckResult::fail("git", e, "Install git")),
  }

  let engine = ContainerEngine::new(&config.image.engine);
  match probe_version(engine.program()) {
    Ok(version) => results.push(CheckResult::pass("engine", version)),
    Err(e) => results.push(CheckResult::fail(
      "engine",
      format!("{}: {}", engine.program(), e),
      format!("Install {} or set `image.engine` in pipeline.toml", engine.program()),
    )),
  }

  let dockerfile = workspace_root.join(&config.image.dockerfile);
  if dockerfile.is_file() {
    results.push(CheckResult::pass("dockerfile", dockerfile.display().to_string()));
  } else {
    results.push(CheckResult::fail(
      "dockerfile",
      format!("{} not found", dockerfile.display()),
      "Set `image.dockerfile` in pipeline.toml",
    ));
  }

  match CronSchedule::parse(&config.pull_request.schedule) {
    Ok(schedule) => results.push(CheckResult::pass("schedule", schedule.expression().to_string())),
    Err(e) => results.push(CheckResult::fail("schedule", e.to_string(), "Use a 5-field cron expression")),
  }

  results
}

/// Run the doctor command; fails when any check fails
pub fn run_doctor(workspace_root: &Path, json: bool) -> PipelineResult<()> {
  let results = run_checks(workspace_root);
  let passed = results.iter().filter(|r| r.passed).count();

  if json {
    println!("{}", serde_json::to_string_pretty(&results)?);
  } else {
    println!("🏥 Running health checks...\n");
    for result in &results {
      let icon = if result.passed { "✅" } else { "❌" };
      println!("{} {}: {}", icon, result.check_name, result.message);
      if let Some(ref suggestion) = result.suggestion {
        println!("   💡 Fix: {}", suggestion);
      }
    }
    println!("\nSummary: {}/{} checks passed", passed, results.len());
  }

  if passed == results.len() {
    Ok(())
  } else {
    Err(PipelineError::with_help(
      format!("{} of {} checks failed", results.len() - passed, results.len()),
      "Fix the failing checks above and run `image-pipeline doctor` again.",
    ))
  }
}
