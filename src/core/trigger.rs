//! Trigger detection - which event started this run, and with what values
//!
//! Values come from the GitHub Actions environment (`GITHUB_EVENT_NAME`,
//! `GITHUB_SHA`, `GITHUB_ACTOR`, and the JSON payload at `GITHUB_EVENT_PATH`).
//! Command-line flags override anything read from the environment, which is
//! also how the tool is driven outside of Actions.

use crate::core::error::{PipelineError, PipelineResult, ResultExt, TriggerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Event names understood by the two pipelines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
  Release,
  WorkflowDispatch,
  PullRequest,
  Schedule,
  Other(String),
}

impl EventKind {
  pub fn parse(name: &str) -> Self {
    match name {
      "release" => EventKind::Release,
      "workflow_dispatch" => EventKind::WorkflowDispatch,
      "pull_request" => EventKind::PullRequest,
      "schedule" => EventKind::Schedule,
      other => EventKind::Other(other.to_string()),
    }
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EventKind::Release => write!(f, "release"),
      EventKind::WorkflowDispatch => write!(f, "workflow_dispatch"),
      EventKind::PullRequest => write!(f, "pull_request"),
      EventKind::Schedule => write!(f, "schedule"),
      EventKind::Other(name) => write!(f, "{}", name),
    }
  }
}

/// Manual dispatch inputs
///
/// Neither input changes the image reference; `log_level` seeds the log filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchInputs {
  #[serde(rename = "logLevel", default = "default_log_level")]
  pub log_level: String,
  #[serde(default)]
  pub tags: Option<String>,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for DispatchInputs {
  fn default() -> Self {
    Self {
      log_level: default_log_level(),
      tags: None,
    }
  }
}

/// Subset of the webhook payload the pipelines read
#[derive(Debug, Default, Deserialize)]
pub struct EventPayload {
  #[serde(default)]
  pub action: Option<String>,
  #[serde(default)]
  pub pull_request: Option<PullRequestPayload>,
  #[serde(default)]
  pub inputs: Option<DispatchInputs>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
  pub number: u64,
  #[serde(default)]
  pub base: Option<BranchPayload>,
}

#[derive(Debug, Deserialize)]
pub struct BranchPayload {
  #[serde(rename = "ref")]
  pub ref_name: String,
}

/// Raw values read from the process environment
#[derive(Debug, Clone, Default)]
pub struct TriggerEnv {
  pub event_name: Option<String>,
  pub sha: Option<String>,
  pub actor: Option<String>,
  pub event_path: Option<PathBuf>,
}

impl TriggerEnv {
  /// Capture the GitHub Actions variables of the current process
  pub fn from_process_env() -> Self {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    Self {
      event_name: var("GITHUB_EVENT_NAME"),
      sha: var("GITHUB_SHA"),
      actor: var("GITHUB_ACTOR"),
      event_path: var("GITHUB_EVENT_PATH").map(PathBuf::from),
    }
  }

  /// Load the event payload, or an empty one when no path is set
  pub fn payload(&self) -> PipelineResult<EventPayload> {
    let Some(path) = &self.event_path else {
      return Ok(EventPayload::default());
    };
    if !path.exists() {
      tracing::warn!(path = %path.display(), "event payload not found, ignoring");
      return Ok(EventPayload::default());
    }
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read event payload {}", path.display()))?;
    let payload =
      serde_json::from_str(&content).with_context(|| format!("Failed to parse event payload {}", path.display()))?;
    Ok(payload)
  }
}

/// Command-line overrides; any `Some` wins over the environment
#[derive(Debug, Clone, Default)]
pub struct TriggerOverrides {
  pub event: Option<String>,
  pub sha: Option<String>,
  pub pr_number: Option<String>,
  pub actor: Option<String>,
  pub base_ref: Option<String>,
}

/// What started a Release Publisher run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReleaseTrigger {
  /// A release was published
  Release { sha: Option<String> },
  /// Someone ran the workflow by hand
  ManualDispatch { sha: Option<String>, inputs: DispatchInputs },
}

impl ReleaseTrigger {
  pub fn sha(&self) -> Option<&str> {
    match self {
      ReleaseTrigger::Release { sha } | ReleaseTrigger::ManualDispatch { sha, .. } => sha.as_deref(),
    }
  }

  /// Same trigger with the commit id replaced
  pub fn with_sha(self, sha: Option<String>) -> Self {
    match self {
      ReleaseTrigger::Release { .. } => ReleaseTrigger::Release { sha },
      ReleaseTrigger::ManualDispatch { inputs, .. } => ReleaseTrigger::ManualDispatch { sha, inputs },
    }
  }

  pub fn inputs(&self) -> Option<&DispatchInputs> {
    match self {
      ReleaseTrigger::ManualDispatch { inputs, .. } => Some(inputs),
      ReleaseTrigger::Release { .. } => None,
    }
  }

  /// Detect the trigger; no event name at all means a manual run
  pub fn detect(env: &TriggerEnv, overrides: &TriggerOverrides) -> PipelineResult<Self> {
    let event_name = overrides.event.clone().or_else(|| env.event_name.clone());
    let event = event_name
      .as_deref()
      .map(EventKind::parse)
      .unwrap_or(EventKind::WorkflowDispatch);
    let payload = env.payload()?;
    let sha = overrides.sha.clone().or_else(|| env.sha.clone());

    match event {
      EventKind::Release => {
        if let Some(action) = payload.action.as_deref()
          && action != "published"
        {
          return Err(PipelineError::Trigger(TriggerError::UnsupportedEvent {
            event: format!("release ({})", action),
            pipeline: "release".to_string(),
          }));
        }
        Ok(ReleaseTrigger::Release { sha })
      }
      EventKind::WorkflowDispatch => Ok(ReleaseTrigger::ManualDispatch {
        sha,
        inputs: payload.inputs.unwrap_or_default(),
      }),
      other => Err(PipelineError::Trigger(TriggerError::UnsupportedEvent {
        event: other.to_string(),
        pipeline: "release".to_string(),
      })),
    }
  }
}

/// What started a PR Image Builder run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PrTrigger {
  /// A pull request was opened or updated
  PullRequest {
    number: String,
    base_ref: Option<String>,
    actor: String,
  },
  /// The monthly schedule fired
  Schedule { sha: Option<String>, actor: String },
}

impl PrTrigger {
  pub fn actor(&self) -> &str {
    match self {
      PrTrigger::PullRequest { actor, .. } | PrTrigger::Schedule { actor, .. } => actor,
    }
  }

  /// Detect the trigger; without an event name a PR number must be given
  pub fn detect(env: &TriggerEnv, overrides: &TriggerOverrides) -> PipelineResult<Self> {
    let event_name = overrides.event.clone().or_else(|| env.event_name.clone());
    let event = event_name
      .as_deref()
      .map(EventKind::parse)
      .unwrap_or(EventKind::PullRequest);
    let payload = env.payload()?;
    let actor = overrides
      .actor
      .clone()
      .or_else(|| env.actor.clone())
      .ok_or_else(|| {
        PipelineError::Trigger(TriggerError::MissingValue {
          field: "actor".to_string(),
        })
      })?;

    match event {
      EventKind::PullRequest => {
        let number = overrides
          .pr_number
          .clone()
          .or_else(|| payload.pull_request.as_ref().map(|pr| pr.number.to_string()))
          .ok_or_else(|| {
            PipelineError::Trigger(TriggerError::MissingValue {
              field: "pr-number".to_string(),
            })
          })?;
        let base_ref = overrides.base_ref.clone().or_else(|| {
          payload
            .pull_request
            .and_then(|pr| pr.base)
            .map(|base| base.ref_name)
        });
        Ok(PrTrigger::PullRequest {
          number,
          base_ref,
          actor,
        })
      }
      EventKind::Schedule => Ok(PrTrigger::Schedule {
        sha: overrides.sha.clone().or_else(|| env.sha.clone()),
        actor,
      }),
      other => Err(PipelineError::Trigger(TriggerError::UnsupportedEvent {
        event: other.to_string(),
        pipeline: "pull-request".to_string(),
      })),
    }
  }
}
