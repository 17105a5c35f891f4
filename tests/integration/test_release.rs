//! Release publisher end to end

use crate::helpers::{TestWorkspace, run_image_pipeline, stderr, stdout};
use anyhow::Result;

const SHA: &str = "abc1234def0123456789abc1234def0123456789";
const IMAGE: &str = "ghcr.io/pyriemann/pyriemann-qiskit:abc1234";

#[test]
fn test_release_dry_run_plan() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(&ws.path, &["release", "--sha", SHA, "--dry-run", "--json"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let plan: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(plan["pipeline"], "release");
  assert_eq!(plan["image"], IMAGE);
  let kinds: Vec<&str> = plan["steps"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["kind"].as_str().unwrap())
    .collect();
  assert_eq!(kinds, vec!["build", "login", "push"]);

  // Dry run never touches the engine
  assert!(ws.engine_calls().is_empty());
  Ok(())
}

#[test]
fn test_release_publishes_in_order() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["release", "--event", "release", "--sha", SHA],
    &[("GITHUB_TOKEN", "s3cret-token")],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let calls = ws.engine_calls();
  assert_eq!(calls.len(), 3, "calls: {:?}", calls);
  assert_eq!(calls[0], format!("build --file Dockerfile --tag {} .", IMAGE));
  assert_eq!(calls[1], "login ghcr.io --username pyriemann --password-stdin");
  assert_eq!(calls[2], format!("push {}", IMAGE));

  // Token arrives on stdin only
  assert_eq!(ws.login_stdin().as_deref(), Some("s3cret-token"));
  assert!(!calls.iter().any(|c| c.contains("s3cret-token")));
  Ok(())
}

#[test]
fn test_release_build_failure_never_pushes() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["release", "--sha", SHA, "--json"],
    &[("GITHUB_TOKEN", "token"), ("FAKE_ENGINE_FAIL", "build")],
  )?;
  assert_eq!(output.status.code(), Some(3));

  let calls = ws.engine_calls();
  assert_eq!(calls.len(), 1);
  assert!(calls[0].starts_with("build "));

  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(report["steps"][0]["status"], "failed");
  assert_eq!(report["steps"][1]["status"], "skipped");
  assert_eq!(report["steps"][2]["status"], "skipped");
  Ok(())
}

#[test]
fn test_release_login_failure_never_pushes() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["release", "--sha", SHA],
    &[("GITHUB_TOKEN", "token"), ("FAKE_ENGINE_FAIL", "login")],
  )?;
  assert_eq!(output.status.code(), Some(3));

  let calls = ws.engine_calls();
  assert_eq!(calls.len(), 2);
  assert!(!calls.iter().any(|c| c.starts_with("push")));
  Ok(())
}

#[test]
fn test_release_missing_token_fails_before_build() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(&ws.path, &["release", "--sha", SHA], &[])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("GITHUB_TOKEN"));
  assert!(ws.engine_calls().is_empty());
  Ok(())
}

#[test]
fn test_release_unpublished_action_is_rejected() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let event = ws.write_event(r#"{"action": "created"}"#)?;

  let output = run_image_pipeline(
    &ws.path,
    &["release", "--dry-run"],
    &[
      ("GITHUB_EVENT_NAME", "release"),
      ("GITHUB_SHA", SHA),
      ("GITHUB_EVENT_PATH", event.to_str().unwrap()),
    ],
  )?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_release_from_github_env() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let event = ws.write_event(r#"{"action": "published"}"#)?;

  let output = run_image_pipeline(
    &ws.path,
    &["release", "--dry-run", "--json"],
    &[
      ("GITHUB_EVENT_NAME", "release"),
      ("GITHUB_SHA", SHA),
      ("GITHUB_EVENT_PATH", event.to_str().unwrap()),
    ],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let plan: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(plan["image"], IMAGE);
  Ok(())
}

#[test]
fn test_pull_request_event_is_not_a_release() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(&ws.path, &["release", "--event", "pull_request", "--sha", SHA], &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(ws.engine_calls().is_empty());
  Ok(())
}
