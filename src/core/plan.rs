//! Plans - the ordered steps a pipeline run will perform
//!
//! Every run builds a `Plan` before touching the container engine, enabling:
//!
//! - **Dry-run mode**: show what will happen without doing it
//! - **Auditability**: plans are JSON-serializable for CI logs
//! - **Identity**: the plan id is a content hash, so identical triggers give
//!   identical ids
//!
//! ```text
//! Trigger -> TagResolver -> Plan -> executor -> RunReport
//! ```

use crate::core::config::PipelineConfig;
use crate::core::engine::{ContainerEngine, Invocation};
use crate::core::error::PipelineResult;
use crate::core::image::ImageRef;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of plan steps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// Which automation entry a plan belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
  /// Build and push under the short commit hash
  Release,
  /// Build only, tagged with the pull-request number
  PullRequest,
}

impl fmt::Display for PipelineKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PipelineKind::Release => write!(f, "release"),
      PipelineKind::PullRequest => write!(f, "pull-request"),
    }
  }
}

/// Step kinds, in the only order they may run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
  Build,
  Login,
  Push,
}

impl fmt::Display for StepKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepKind::Build => write!(f, "build"),
      StepKind::Login => write!(f, "login"),
      StepKind::Push => write!(f, "push"),
    }
  }
}

/// One command in a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
  pub kind: StepKind,
  pub invocation: Invocation,
  /// Registry token is written to the command's stdin
  #[serde(default)]
  pub needs_secret: bool,
}

/// A plan represents the sequence of steps for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
  pub id: PlanId,
  pub pipeline: PipelineKind,
  pub image: String,
  pub steps: Vec<Step>,
}

impl Plan {
  /// Create an empty plan
  pub fn new(pipeline: PipelineKind, image: &ImageRef) -> Self {
    let mut plan = Self {
      id: PlanId::from_contents(&[]),
      pipeline,
      image: image.to_string(),
      steps: Vec::new(),
    };
    plan.recompute_id();
    plan
  }

  /// Release publisher: build, login, push
  pub fn release(config: &PipelineConfig, image: &ImageRef) -> Self {
    let engine = ContainerEngine::new(&config.image.engine);
    let mut plan = Self::new(PipelineKind::Release, image);
    plan.add_step(StepKind::Build, engine.build(image, &config.image.dockerfile, &config.image.context));
    plan.steps.push(Step {
      kind: StepKind::Login,
      invocation: engine.login(&config.image.registry, config.release.login_user()),
      needs_secret: true,
    });
    plan.add_step(StepKind::Push, engine.push(image));
    plan.recompute_id();
    plan
  }

  /// PR image builder: build only
  pub fn pull_request(config: &PipelineConfig, image: &ImageRef) -> Self {
    let engine = ContainerEngine::new(&config.image.engine);
    let mut plan = Self::new(PipelineKind::PullRequest, image);
    plan.add_step(StepKind::Build, engine.build(image, &config.image.dockerfile, &config.image.context));
    plan
  }

  /// Add a step that needs no secret
  pub fn add_step(&mut self, kind: StepKind, invocation: Invocation) {
    self.steps.push(Step {
      kind,
      invocation,
      needs_secret: false,
    });
    self.recompute_id();
  }

  /// Whether running this plan publishes anything
  pub fn pushes(&self) -> bool {
    self.steps.iter().any(|s| s.kind == StepKind::Push)
  }

  /// Whether any step reads the registry token
  pub fn needs_secret(&self) -> bool {
    self.steps.iter().any(|s| s.needs_secret)
  }

  /// Recompute plan ID based on current contents
  fn recompute_id(&mut self) {
    let json = serde_json::to_vec(&(&self.pipeline, &self.image, &self.steps)).unwrap_or_default();
    self.id = PlanId::from_contents(&json);
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> PipelineResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!("📋 Plan: {} ({})\n", self.pipeline, self.id));
    output.push_str(&format!("   Image: {}\n", self.image));
    output.push_str(&format!("\n   Steps ({}):\n", self.steps.len()));

    for (i, step) in self.steps.iter().enumerate() {
      output.push_str(&format!("   {}. [{}] {}", i + 1, step.kind, step.invocation.display()));
      if step.needs_secret {
        output.push_str("  (token on stdin)");
      }
      output.push('\n');
    }

    if self.pushes() {
      output.push_str("\n⚠️  NOTE: This plan publishes to the registry\n");
    }

    output
  }
}
