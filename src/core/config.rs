use crate::core::error::{ConfigError, PipelineError, PipelineResult, ResultExt};
use crate::core::schedule::CronSchedule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for image-pipeline
/// Searched in order: pipeline.toml, .pipeline.toml, .config/pipeline.toml
///
/// Every section is optional; a missing file yields the defaults used by the
/// pyriemann-qiskit workflows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
  #[serde(default)]
  pub image: ImageConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
  #[serde(default)]
  pub pull_request: PullRequestConfig,
}

/// What to build and where it goes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
  /// Registry host (default: ghcr.io)
  #[serde(default = "default_registry")]
  pub registry: String,

  /// Repository name under the namespace (default: pyriemann-qiskit)
  #[serde(default = "default_image_name")]
  pub name: String,

  /// Build context, relative to the workspace root
  #[serde(default = "default_context")]
  pub context: PathBuf,

  /// Build file, relative to the workspace root
  #[serde(default = "default_dockerfile")]
  pub dockerfile: PathBuf,

  /// Container engine binary (docker, podman)
  #[serde(default = "default_engine")]
  pub engine: String,
}

fn default_registry() -> String {
  "ghcr.io".to_string()
}

fn default_image_name() -> String {
  "pyriemann-qiskit".to_string()
}

fn default_context() -> PathBuf {
  PathBuf::from(".")
}

fn default_dockerfile() -> PathBuf {
  PathBuf::from("Dockerfile")
}

fn default_engine() -> String {
  "docker".to_string()
}

impl Default for ImageConfig {
  fn default() -> Self {
    Self {
      registry: default_registry(),
      name: default_image_name(),
      context: default_context(),
      dockerfile: default_dockerfile(),
      engine: default_engine(),
    }
  }
}

/// Release publisher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Fixed namespace for published images
  #[serde(default = "default_namespace")]
  pub namespace: String,

  /// Registry login user (default: namespace)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub username: Option<String>,

  /// Length of the abbreviated commit hash used as tag
  #[serde(default = "default_short_sha_len")]
  pub short_sha_len: usize,

  /// Environment variable holding the registry token
  #[serde(default = "default_token_env")]
  pub token_env: String,
}

fn default_namespace() -> String {
  "pyriemann".to_string()
}

fn default_short_sha_len() -> usize {
  7
}

fn default_token_env() -> String {
  "GITHUB_TOKEN".to_string()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      namespace: default_namespace(),
      username: None,
      short_sha_len: default_short_sha_len(),
      token_env: default_token_env(),
    }
  }
}

impl ReleaseConfig {
  /// Registry login user, falling back to the namespace
  pub fn login_user(&self) -> &str {
    self.username.as_deref().unwrap_or(&self.namespace)
  }
}

/// PR image builder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestConfig {
  /// Pull requests must target this branch
  #[serde(default = "default_base_branch")]
  pub base_branch: String,

  /// 5-field cron expression for scheduled builds
  #[serde(default = "default_schedule")]
  pub schedule: String,
}

fn default_base_branch() -> String {
  "main".to_string()
}

fn default_schedule() -> String {
  "0 0 1 * *".to_string()
}

impl Default for PullRequestConfig {
  fn default() -> Self {
    Self {
      base_branch: default_base_branch(),
      schedule: default_schedule(),
    }
  }
}

impl PipelineConfig {
  /// Find config file in search order: pipeline.toml, .pipeline.toml, .config/pipeline.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("pipeline.toml"),
      path.join(".pipeline.toml"),
      path.join(".config").join("pipeline.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the first file found, or defaults when there is none
  pub fn load(path: &Path) -> PipelineResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!(root = %path.display(), "no pipeline.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: PipelineConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.validate()?;
    tracing::debug!(path = %config_path.display(), "loaded configuration");

    Ok(config)
  }

  /// Save config to pipeline.toml (default location)
  pub fn save(&self, path: &Path) -> PipelineResult<PathBuf> {
    let config_path = path.join("pipeline.toml");
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(config_path)
  }

  /// Validate field ranges and the schedule expression
  pub fn validate(&self) -> PipelineResult<()> {
    let required = [
      ("image.registry", &self.image.registry),
      ("image.name", &self.image.name),
      ("image.engine", &self.image.engine),
      ("release.namespace", &self.release.namespace),
      ("release.token_env", &self.release.token_env),
      ("pull_request.base_branch", &self.pull_request.base_branch),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(PipelineError::Config(ConfigError::InvalidField {
          field: field.to_string(),
          reason: "must not be empty".to_string(),
        }));
      }
    }

    if !(7..=40).contains(&self.release.short_sha_len) {
      return Err(PipelineError::Config(ConfigError::InvalidField {
        field: "release.short_sha_len".to_string(),
        reason: format!("{} is outside 7..=40", self.release.short_sha_len),
      }));
    }

    CronSchedule::parse(&self.pull_request.schedule)?;

    Ok(())
  }
}
