//! Release publisher
//!
//! Runs on a published release or a manual dispatch:
//! 1. Tag = abbreviated commit SHA of the triggering event
//! 2. Build the image
//! 3. Log in to the registry with the token from `release.token_env`
//! 4. Push
//!
//! A tag appears in the registry only when all three steps succeed.

use crate::core::context::PipelineContext;
use crate::core::engine::SystemRunner;
use crate::core::error::{EngineError, PipelineError, PipelineResult};
use crate::core::executor::execute;
use crate::core::plan::Plan;
use crate::core::tag::{Resolution, TagResolver};
use crate::core::trigger::{ReleaseTrigger, TriggerEnv, TriggerOverrides};
use crate::ui::report::{print_plan, print_report};
use secrecy::SecretString;

/// Resolve the release image reference
///
/// An explicit `rev` wins over the trigger's commit id; otherwise git is
/// opened only when the trigger has no SHA.
pub fn resolve_release(ctx: &PipelineContext, trigger: &ReleaseTrigger, rev: Option<&str>) -> PipelineResult<Resolution> {
  let trigger = match (rev, trigger.sha()) {
    (Some(rev), Some(sha)) => {
      tracing::warn!(rev, sha, "--rev overrides the commit id of the triggering event");
      trigger.clone().with_sha(None)
    }
    _ => trigger.clone(),
  };

  let git = if trigger.sha().is_none() { Some(ctx.git()?) } else { None };
  let rev = rev.unwrap_or("HEAD");
  let mut resolver = TagResolver::new(&ctx.config);
  if let Some(git) = &git {
    resolver = resolver.with_git(git, rev);
  }

  resolver.resolve_release(&trigger)
}

/// Run the release publisher
pub fn run_release(
  ctx: &PipelineContext,
  overrides: TriggerOverrides,
  rev: Option<String>,
  dry_run: bool,
  json: bool,
) -> PipelineResult<()> {
  let env = TriggerEnv::from_process_env();
  let trigger = ReleaseTrigger::detect(&env, &overrides)?;

  if let Some(inputs) = trigger.inputs() {
    tracing::info!(
      log_level = %inputs.log_level,
      tags = inputs.tags.as_deref().unwrap_or(""),
      "manual dispatch"
    );
  }

  let resolution = resolve_release(ctx, &trigger, rev.as_deref())?;
  tracing::info!(image = %resolution.image, source = ?resolution.source, "resolved release image");

  let plan = Plan::release(&ctx.config, &resolution.image);

  if dry_run {
    return print_plan(&plan, json);
  }

  let token = if plan.needs_secret() {
    Some(read_token(&ctx.config.release.token_env)?)
  } else {
    None
  };

  if !json {
    println!("📦 Publishing {}", resolution.image);
  }
  let runner = SystemRunner::new(ctx.workspace_root());
  let report = execute(&plan, &runner, token.as_ref());
  print_report(&report, json)?;
  report.into_result().map(|_| ())
}

/// Read the registry token; an unset or empty variable stops the run before the build
fn read_token(var: &str) -> PipelineResult<SecretString> {
  match std::env::var(var) {
    Ok(value) if !value.is_empty() => Ok(SecretString::from(value)),
    _ => Err(PipelineError::Engine(EngineError::MissingToken { var: var.to_string() })),
  }
}
