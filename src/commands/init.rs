//! `image-pipeline init` - write a pipeline.toml with the default settings

use crate::core::config::PipelineConfig;
use crate::core::error::{ConfigError, PipelineError, PipelineResult};
use std::path::Path;

/// Run the init command
pub fn run_init(workspace_root: &Path, force: bool) -> PipelineResult<()> {
  if let Some(existing) = PipelineConfig::find_config_path(workspace_root)
    && !force
  {
    return Err(PipelineError::Config(ConfigError::AlreadyExists { path: existing }));
  }

  let path = PipelineConfig::default().save(workspace_root)?;
  tracing::debug!(path = %path.display(), "wrote default configuration");
  println!("✅ Wrote {}", path.display());
  Ok(())
}
