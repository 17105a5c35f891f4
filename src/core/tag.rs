//! Tag resolution for both pipelines
//!
//! - Release publisher: tag = abbreviated commit SHA, namespace = fixed
//!   release namespace
//! - PR image builder: tag = pull-request number (verbatim), namespace =
//!   triggering actor with `[`/`]` removed
//!
//! Scheduled PR-builder runs carry no pull request and fall back to the
//! abbreviated commit SHA.

use crate::core::config::PipelineConfig;
use crate::core::error::{PipelineError, PipelineResult, TriggerError};
use crate::core::image::{ImageRef, sanitize_actor};
use crate::core::trigger::{PrTrigger, ReleaseTrigger};
use crate::core::vcs::SystemGit;
use serde::Serialize;

/// Where a tag came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
  /// Abbreviated from a commit id given by the trigger
  CommitSha,
  /// Abbreviated by git from a local revision
  GitRevision,
  /// Pull-request number
  PullRequest,
}

/// A resolved tag together with the full image reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
  pub tag: String,
  pub source: TagSource,
  pub image: ImageRef,
}

/// Abbreviate a commit id to its first `len` characters
///
/// Accepts 7-40 hex characters; ids shorter than `len` are kept whole.
pub fn short_sha(sha: &str, len: usize) -> PipelineResult<String> {
  let sha = sha.trim();
  if !(7..=40).contains(&sha.len()) || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
    return Err(PipelineError::Trigger(TriggerError::InvalidSha { sha: sha.to_string() }));
  }
  Ok(sha[..len.min(sha.len())].to_ascii_lowercase())
}

/// Pull-request number as tag, taken verbatim once it is known to be a number
pub fn pr_tag(number: &str) -> PipelineResult<String> {
  if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
    return Err(PipelineError::Trigger(TriggerError::InvalidPrNumber {
      value: number.to_string(),
    }));
  }
  Ok(number.to_string())
}

/// Resolves tags; `git` is consulted only when the trigger has no commit id
pub struct TagResolver<'a> {
  config: &'a PipelineConfig,
  git: Option<&'a SystemGit>,
  rev: &'a str,
}

impl<'a> TagResolver<'a> {
  pub fn new(config: &'a PipelineConfig) -> Self {
    Self {
      config,
      git: None,
      rev: "HEAD",
    }
  }

  /// Fall back to this repository (at `rev`) when no commit id is supplied
  pub fn with_git(mut self, git: &'a SystemGit, rev: &'a str) -> Self {
    self.git = Some(git);
    self.rev = rev;
    self
  }

  /// Release publisher: `<registry>/<namespace>/<name>:<short sha>`
  pub fn resolve_release(&self, trigger: &ReleaseTrigger) -> PipelineResult<Resolution> {
    let (tag, source) = self.commit_tag(trigger.sha())?;
    let image = ImageRef::new(
      &self.config.image.registry,
      &self.config.release.namespace,
      &self.config.image.name,
      &tag,
    )?;
    Ok(Resolution { tag, source, image })
  }

  /// PR image builder: `<registry>/<sanitized actor>/<name>:<pr number>`
  pub fn resolve_pull_request(&self, trigger: &PrTrigger) -> PipelineResult<Resolution> {
    let namespace = sanitize_actor(trigger.actor())?;
    let (tag, source) = match trigger {
      PrTrigger::PullRequest { number, .. } => (pr_tag(number)?, TagSource::PullRequest),
      PrTrigger::Schedule { sha, .. } => self.commit_tag(sha.as_deref())?,
    };
    let image = ImageRef::new(&self.config.image.registry, namespace, &self.config.image.name, &tag)?;
    Ok(Resolution { tag, source, image })
  }

  fn commit_tag(&self, sha: Option<&str>) -> PipelineResult<(String, TagSource)> {
    let len = self.config.release.short_sha_len;
    if let Some(sha) = sha {
      return Ok((short_sha(sha, len)?, TagSource::CommitSha));
    }

    let git = self.git.ok_or_else(|| {
      PipelineError::Trigger(TriggerError::MissingValue {
        field: "sha".to_string(),
      })
    })?;
    let short = git.short_commit(self.rev, len)?;
    tracing::debug!(repo = %git.work_tree().display(), rev = self.rev, short = %short, "abbreviated local revision");
    Ok((short, TagSource::GitRevision))
  }
}
