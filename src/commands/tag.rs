//! `image-pipeline tag` - print the tag and image a pipeline would use
//!
//! Useful in workflow steps that only need the reference (e.g. to pass it to
//! another action) without building anything.

use crate::commands::pr::resolve_pr;
use crate::commands::release::resolve_release;
use crate::core::context::PipelineContext;
use crate::core::error::PipelineResult;
use crate::core::trigger::{PrTrigger, ReleaseTrigger, TriggerEnv, TriggerOverrides};
use crate::ui::report::print_resolution;

/// Which pipeline's naming rules to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TagPipeline {
  Release,
  Pr,
}

/// Run the tag command
pub fn run_tag(
  ctx: &PipelineContext,
  pipeline: TagPipeline,
  overrides: TriggerOverrides,
  rev: Option<String>,
  json: bool,
) -> PipelineResult<()> {
  let env = TriggerEnv::from_process_env();
  let resolution = match pipeline {
    TagPipeline::Release => {
      let trigger = ReleaseTrigger::detect(&env, &overrides)?;
      resolve_release(ctx, &trigger, rev.as_deref())?
    }
    TagPipeline::Pr => {
      let trigger = PrTrigger::detect(&env, &overrides)?;
      resolve_pr(ctx, &trigger)?
    }
  };

  print_resolution(&resolution, json)
}
