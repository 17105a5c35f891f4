//! Terminal output for plans, run reports and resolutions

use crate::core::error::PipelineResult;
use crate::core::executor::{RunReport, StepOutcome};
use crate::core::plan::Plan;
use crate::core::tag::Resolution;

/// Print a plan without running it
pub fn print_plan(plan: &Plan, json: bool) -> PipelineResult<()> {
  if json {
    println!("{}", plan.to_json()?);
  } else {
    print!("{}", plan.to_human_readable());
    println!("\n🔍 Dry-run mode (nothing executed)");
  }
  Ok(())
}

/// Print the outcome of every step
pub fn print_report(report: &RunReport, json: bool) -> PipelineResult<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(report)?);
    return Ok(());
  }

  println!();
  for step in &report.steps {
    match &step.outcome {
      StepOutcome::Succeeded => println!("✅ {}: {}", step.kind, step.command),
      StepOutcome::Failed { reason, .. } => println!("❌ {}: {} ({})", step.kind, step.command, reason),
      StepOutcome::Skipped => println!("⏭️  {}: skipped", step.kind),
    }
  }

  if report.success() {
    println!("\n✨ {} done (plan {})", report.image, report.plan_id);
  }
  Ok(())
}

/// Print a resolved tag and image reference
pub fn print_resolution(resolution: &Resolution, json: bool) -> PipelineResult<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(resolution)?);
  } else {
    println!("tag:   {}", resolution.tag);
    println!("image: {}", resolution.image);
  }
  Ok(())
}
