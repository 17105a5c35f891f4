//! Plan execution
//!
//! Steps run strictly in order. The first failing step ends the run: every
//! later step is reported as skipped and never invoked. Nothing is retried
//! and nothing already done is rolled back.

use crate::core::engine::CommandRunner;
use crate::core::error::{EngineError, PipelineError, PipelineResult};
use crate::core::plan::{Plan, PlanId, StepKind};
use secrecy::SecretString;
use serde::Serialize;

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
  Succeeded,
  Failed { code: Option<i32>, reason: String },
  Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
  pub kind: StepKind,
  pub command: String,
  #[serde(flatten)]
  pub outcome: StepOutcome,
}

/// What happened when a plan ran
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub plan_id: PlanId,
  pub image: String,
  pub steps: Vec<StepReport>,
}

impl RunReport {
  pub fn success(&self) -> bool {
    self.steps.iter().all(|s| s.outcome == StepOutcome::Succeeded)
  }

  /// First failed step, if any
  pub fn failed_step(&self) -> Option<&StepReport> {
    self
      .steps
      .iter()
      .find(|s| matches!(s.outcome, StepOutcome::Failed { .. }))
  }

  /// Convert a failed run into the error that ends the process
  pub fn into_result(self) -> PipelineResult<Self> {
    let failure = self.failed_step().map(|step| match &step.outcome {
      StepOutcome::Failed { code, .. } => (step.kind, *code),
      _ => (step.kind, None),
    });
    match failure {
      Some((kind, code)) => Err(PipelineError::Engine(EngineError::StepFailed {
        step: kind.to_string(),
        code,
      })),
      None => Ok(self),
    }
  }
}

/// Run every step of `plan`, halting at the first failure
pub fn execute(plan: &Plan, runner: &dyn CommandRunner, secret: Option<&SecretString>) -> RunReport {
  let mut steps = Vec::with_capacity(plan.steps.len());
  let mut halted = false;

  for step in &plan.steps {
    let command = step.invocation.display();

    if halted {
      tracing::debug!(step = %step.kind, "skipping after earlier failure");
      steps.push(StepReport {
        kind: step.kind,
        command,
        outcome: StepOutcome::Skipped,
      });
      continue;
    }

    tracing::info!(step = %step.kind, command = %command, "running step");
    let stdin = if step.needs_secret { secret } else { None };

    let outcome = if step.needs_secret && stdin.is_none() {
      StepOutcome::Failed {
        code: None,
        reason: "no registry token available".to_string(),
      }
    } else {
      match runner.run(&step.invocation, stdin) {
        Ok(result) if result.success() => StepOutcome::Succeeded,
        Ok(result) => StepOutcome::Failed {
          code: result.code,
          reason: match result.code {
            Some(code) => format!("exited with code {}", code),
            None => "terminated by signal".to_string(),
          },
        },
        Err(e) => StepOutcome::Failed {
          code: None,
          reason: e.to_string(),
        },
      }
    };

    if let StepOutcome::Failed { reason, .. } = &outcome {
      tracing::error!(step = %step.kind, reason = %reason, "step failed");
      halted = true;
    }

    steps.push(StepReport {
      kind: step.kind,
      command,
      outcome,
    });
  }

  RunReport {
    plan_id: plan.id.clone(),
    image: plan.image.clone(),
    steps,
  }
}
