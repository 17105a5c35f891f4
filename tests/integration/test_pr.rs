//! PR image builder end to end

use crate::helpers::{TestWorkspace, run_image_pipeline, stderr, stdout};
use anyhow::Result;

#[test]
fn test_pr_builds_without_push() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let event = ws.write_event(r#"{"action": "opened", "pull_request": {"number": 42, "base": {"ref": "main"}}}"#)?;

  let output = run_image_pipeline(
    &ws.path,
    &["pr"],
    &[
      ("GITHUB_EVENT_NAME", "pull_request"),
      ("GITHUB_ACTOR", "some-actor"),
      ("GITHUB_EVENT_PATH", event.to_str().unwrap()),
      ("GITHUB_TOKEN", "token"),
    ],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let calls = ws.engine_calls();
  assert_eq!(
    calls,
    vec!["build --file Dockerfile --tag ghcr.io/some-actor/pyriemann-qiskit:42 .".to_string()]
  );
  assert!(ws.login_stdin().is_none());
  Ok(())
}

#[test]
fn test_pr_bot_actor_namespace() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["pr", "--pr-number", "7", "--actor", "dependabot[bot]", "--dry-run", "--json"],
    &[],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let plan: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(plan["image"], "ghcr.io/dependabotbot/pyriemann-qiskit:7");
  assert_eq!(plan["steps"].as_array().unwrap().len(), 1);
  Ok(())
}

#[test]
fn test_pr_other_base_is_skipped() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["pr", "--pr-number", "5", "--actor", "someone", "--base-ref", "develop", "--json"],
    &[],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let skipped: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(skipped["skipped"], true);
  assert!(ws.engine_calls().is_empty());
  Ok(())
}

#[test]
fn test_pr_build_failure_exit_code() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(
    &ws.path,
    &["pr", "--pr-number", "9", "--actor", "someone"],
    &[("FAKE_ENGINE_FAIL", "build")],
  )?;
  assert_eq!(output.status.code(), Some(3));
  assert_eq!(ws.engine_calls().len(), 1);
  Ok(())
}

#[test]
fn test_scheduled_run_tags_with_head() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let head = ws.head()?;

  let output = run_image_pipeline(
    &ws.path,
    &["pr", "--event", "schedule", "--dry-run", "--json"],
    &[("GITHUB_ACTOR", "some-actor")],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));

  let plan: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(
    plan["image"],
    format!("ghcr.io/some-actor/pyriemann-qiskit:{}", &head[..7])
  );
  Ok(())
}

#[test]
fn test_pr_requires_actor() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_image_pipeline(&ws.path, &["pr", "--pr-number", "3"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("actor"));
  Ok(())
}
