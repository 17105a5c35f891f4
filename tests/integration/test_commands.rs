//! tag, schedule, init and doctor

use crate::helpers::{TestWorkspace, run_image_pipeline, stderr, stdout};
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_tag_release_from_sha() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(&ws.path, &["tag", "release", "--sha", "abc1234def"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("ghcr.io/pyriemann/pyriemann-qiskit:abc1234"));
  Ok(())
}

#[test]
fn test_tag_release_from_local_head() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let head = ws.head()?;

  let output = run_image_pipeline(&ws.path, &["tag", "release", "--json"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let resolution: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(resolution["tag"], &head[..7]);
  assert_eq!(resolution["source"], "git_revision");
  Ok(())
}

#[test]
fn test_tag_release_rev_overrides_github_sha() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let head = ws.head()?;

  let output = run_image_pipeline(
    &ws.path,
    &["tag", "release", "--rev", "HEAD", "--json"],
    &[("GITHUB_SHA", "0000000111111122222223333333444444455555")],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let resolution: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(resolution["tag"], &head[..7]);
  assert_eq!(resolution["source"], "git_revision");
  assert!(stderr(&output).contains("--rev overrides"));
  Ok(())
}

#[test]
fn test_tag_pr_json() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["tag", "pr", "--pr-number", "42", "--actor", "some-actor", "--json"],
    &[],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let resolution: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(resolution["tag"], "42");
  assert_eq!(resolution["source"], "pull_request");
  Ok(())
}

#[test]
fn test_tag_rejects_bad_sha() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(&ws.path, &["tag", "release", "--sha", "not-a-sha"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_schedule_upcoming_json() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["schedule", "--after", "2026-03-15T12:00:00Z", "--next", "2", "--json"],
    &[],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let schedule: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  let upcoming: Vec<&str> = schedule["upcoming"]
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t.as_str().unwrap())
    .collect();
  assert_eq!(upcoming, vec!["2026-04-01T00:00:00+00:00", "2026-05-01T00:00:00+00:00"]);
  Ok(())
}

#[test]
fn test_schedule_fires_at() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(&ws.path, &["schedule", "--at", "2026-06-01T00:00:00Z", "--json"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  let result: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(result["fires"], true);

  let output = run_image_pipeline(&ws.path, &["schedule", "--at", "2026-06-02T00:00:00Z", "--json"], &[])?;
  let result: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(result["fires"], false);
  Ok(())
}

#[test]
fn test_init_writes_config_once() -> Result<()> {
  let dir = TempDir::new()?;

  let output = run_image_pipeline(dir.path(), &["init"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  let written = std::fs::read_to_string(dir.path().join("pipeline.toml"))?;
  assert!(written.contains("pyriemann-qiskit"));

  let output = run_image_pipeline(dir.path(), &["init"], &[])?;
  assert_eq!(output.status.code(), Some(1));

  let output = run_image_pipeline(dir.path(), &["init", "--force"], &[])?;
  assert!(output.status.success());
  Ok(())
}

#[test]
fn test_invalid_config_is_user_error() -> Result<()> {
  let ws = TestWorkspace::new()?;
  std::fs::write(ws.path.join("pipeline.toml"), "[pull_request]\nschedule = \"not a cron\"\n")?;

  let output = run_image_pipeline(&ws.path, &["tag", "release", "--sha", "abc1234"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_doctor_reports_fake_engine() -> Result<()> {
  let ws = TestWorkspace::new()?;
  assert!(ws.file_exists("pipeline.toml"));

  let output = run_image_pipeline(&ws.path, &["doctor", "--json"], &[])?;
  let checks: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  let names: Vec<&str> = checks
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["check_name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["config", "git", "engine", "dockerfile", "schedule"]);

  let engine = checks.as_array().unwrap().iter().find(|c| c["check_name"] == "engine").unwrap();
  assert_eq!(engine["passed"], true);
  Ok(())
}

#[test]
fn test_unknown_log_level_falls_back_to_info() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["--log-level", "verbose", "release", "--sha", "abc1234def", "--dry-run"],
    &[],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  let err = stderr(&output);
  assert!(err.contains("unknown log level"));
  // info-level events still come through
  assert!(err.contains("resolved release image"));
  Ok(())
}
