//! Run context - built once in main.rs, passed by reference to every command

use crate::core::config::PipelineConfig;
use crate::core::error::PipelineResult;
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared data for one invocation of the tool
#[derive(Clone)]
pub struct PipelineContext {
  /// Workspace root (build context paths are relative to it)
  pub root: PathBuf,

  /// Loaded configuration, or defaults
  pub config: Arc<PipelineConfig>,
}

impl PipelineContext {
  /// Load configuration from `workspace_root`
  pub fn build(workspace_root: &Path) -> PipelineResult<Self> {
    let config = PipelineConfig::load(workspace_root)?;
    Ok(Self {
      root: workspace_root.to_path_buf(),
      config: Arc::new(config),
    })
  }

  /// Open the repository at the root; only needed when no commit id was given
  pub fn git(&self) -> PipelineResult<SystemGit> {
    SystemGit::open(&self.root)
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.root
  }
}
