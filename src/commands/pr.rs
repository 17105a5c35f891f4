//! PR image builder
//!
//! Runs on pull requests targeting the main branch and on the monthly
//! schedule. Builds `ghcr.io/<actor>/<name>:<pr number>` locally and never
//! pushes.

use crate::core::context::PipelineContext;
use crate::core::engine::SystemRunner;
use crate::core::error::PipelineResult;
use crate::core::executor::execute;
use crate::core::plan::Plan;
use crate::core::tag::{Resolution, TagResolver};
use crate::core::trigger::{PrTrigger, TriggerEnv, TriggerOverrides};
use crate::ui::report::{print_plan, print_report};

/// Resolve the PR image reference; git is opened only for scheduled runs without a SHA
pub fn resolve_pr(ctx: &PipelineContext, trigger: &PrTrigger) -> PipelineResult<Resolution> {
  let needs_git = matches!(trigger, PrTrigger::Schedule { sha: None, .. });
  let git = if needs_git { Some(ctx.git()?) } else { None };
  let mut resolver = TagResolver::new(&ctx.config);
  if let Some(git) = &git {
    resolver = resolver.with_git(git, "HEAD");
  }

  resolver.resolve_pull_request(trigger)
}

/// Run the PR image builder
pub fn run_pr(ctx: &PipelineContext, overrides: TriggerOverrides, dry_run: bool, json: bool) -> PipelineResult<()> {
  let env = TriggerEnv::from_process_env();
  let trigger = PrTrigger::detect(&env, &overrides)?;

  if let PrTrigger::PullRequest {
    base_ref: Some(base),
    number,
    ..
  } = &trigger
    && *base != ctx.config.pull_request.base_branch
  {
    tracing::info!(base = %base, expected = %ctx.config.pull_request.base_branch, "pull request does not target main branch");
    if json {
      println!("{}", serde_json::json!({ "skipped": true, "pr": number, "base_ref": base }));
    } else {
      println!(
        "⏭️  PR #{} targets '{}', not '{}'; nothing to build",
        number, base, ctx.config.pull_request.base_branch
      );
    }
    return Ok(());
  }

  let resolution = resolve_pr(ctx, &trigger)?;
  tracing::info!(image = %resolution.image, source = ?resolution.source, "resolved pull-request image");

  let plan = Plan::pull_request(&ctx.config, &resolution.image);

  if dry_run {
    return print_plan(&plan, json);
  }

  if !json {
    println!("🔨 Building {}", resolution.image);
  }
  let runner = SystemRunner::new(ctx.workspace_root());
  let report = execute(&plan, &runner, None);
  print_report(&report, json)?;
  report.into_result().map(|_| ())
}
