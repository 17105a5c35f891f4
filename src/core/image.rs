//! Image references and the rules for their parts

use crate::core::error::{PipelineError, PipelineResult, TriggerError};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// OCI distribution tag grammar
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]{0,127}$").unwrap());

/// `<registry>/<namespace>/<name>:<tag>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
  pub registry: String,
  pub namespace: String,
  pub name: String,
  pub tag: String,
}

impl ImageRef {
  /// Build a reference, rejecting tags outside the OCI grammar
  pub fn new(
    registry: impl Into<String>,
    namespace: impl Into<String>,
    name: impl Into<String>,
    tag: impl Into<String>,
  ) -> PipelineResult<Self> {
    let tag = tag.into();
    validate_tag(&tag)?;
    Ok(Self {
      registry: registry.into(),
      namespace: namespace.into(),
      name: name.into(),
      tag,
    })
  }

  /// Repository part without the tag
  pub fn repository(&self) -> String {
    format!("{}/{}/{}", self.registry, self.namespace, self.name)
  }
}

impl fmt::Display for ImageRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.repository(), self.tag)
  }
}

pub fn validate_tag(tag: &str) -> PipelineResult<()> {
  if TAG_PATTERN.is_match(tag) {
    Ok(())
  } else {
    Err(PipelineError::Trigger(TriggerError::InvalidTag { tag: tag.to_string() }))
  }
}

/// Remove literal `[` and `]` from an actor name (`dependabot[bot]` -> `dependabotbot`)
pub fn sanitize_actor(actor: &str) -> PipelineResult<String> {
  let sanitized: String = actor.chars().filter(|c| !matches!(c, '[' | ']')).collect();
  if sanitized.trim().is_empty() {
    return Err(PipelineError::Trigger(TriggerError::InvalidActor {
      actor: actor.to_string(),
    }));
  }
  Ok(sanitized)
}
