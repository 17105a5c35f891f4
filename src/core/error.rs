//! Error types for image-pipeline with contextual messages and exit codes
//!
//! Every error maps to a process exit code and may carry a help hint that is
//! printed below the error message.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for image-pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid input, unsupported trigger)
  User = 1,
  /// System error (git, container engine, I/O)
  System = 2,
  /// A pipeline step ran and failed
  StepFailed = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for image-pipeline
#[derive(Debug)]
pub enum PipelineError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Trigger context or identifier errors
  Trigger(TriggerError),

  /// Container engine errors
  Engine(EngineError),

  /// I/O errors; context survives so the exit code stays a system error
  Io { error: io::Error, context: Option<String> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl PipelineError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    PipelineError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    PipelineError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      PipelineError::Message { message, context, help } => PipelineError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      PipelineError::Io { error, context } => PipelineError::Io {
        error,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      PipelineError::Config(_) => ExitCode::User,
      PipelineError::Git(_) => ExitCode::System,
      PipelineError::Trigger(_) => ExitCode::User,
      PipelineError::Engine(EngineError::StepFailed { .. }) => ExitCode::StepFailed,
      PipelineError::Engine(_) => ExitCode::System,
      PipelineError::Io { .. } => ExitCode::System,
      PipelineError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      PipelineError::Config(e) => e.help_message(),
      PipelineError::Git(e) => e.help_message(),
      PipelineError::Trigger(e) => e.help_message(),
      PipelineError::Engine(e) => e.help_message(),
      PipelineError::Message { help, .. } => help.clone(),
      PipelineError::Io { .. } => None,
    }
  }
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PipelineError::Config(e) => write!(f, "{}", e),
      PipelineError::Git(e) => write!(f, "{}", e),
      PipelineError::Trigger(e) => write!(f, "{}", e),
      PipelineError::Engine(e) => write!(f, "{}", e),
      PipelineError::Io { error, context } => {
        write!(f, "I/O error: {}", error)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
      PipelineError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for PipelineError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      PipelineError::Io { error, .. } => Some(error),
      _ => None,
    }
  }
}

impl From<io::Error> for PipelineError {
  fn from(err: io::Error) -> Self {
    PipelineError::Io { error: err, context: None }
  }
}

impl From<toml_edit::de::Error> for PipelineError {
  fn from(err: toml_edit::de::Error) -> Self {
    PipelineError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for PipelineError {
  fn from(err: toml_edit::ser::Error) -> Self {
    PipelineError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for PipelineError {
  fn from(err: serde_json::Error) -> Self {
    PipelineError::message(format!("JSON error: {}", err))
  }
}

impl From<chrono::ParseError> for PipelineError {
  fn from(err: chrono::ParseError) -> Self {
    PipelineError::message(format!("Timestamp parse error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// pipeline.toml already exists (init without --force)
  AlreadyExists { path: PathBuf },

  /// A field holds a value outside its accepted range
  InvalidField { field: String, reason: String },

  /// Invalid cron expression
  InvalidSchedule { expression: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::AlreadyExists { .. } => Some("Pass --force to overwrite the existing file.".to_string()),
      ConfigError::InvalidField { field, .. } => Some(format!("Fix `{}` in pipeline.toml or remove it to use the default.", field)),
      ConfigError::InvalidSchedule { .. } => Some(
        "Use a 5-field cron expression: minute hour day-of-month month day-of-week (e.g. \"0 0 1 * *\").".to_string(),
      ),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::AlreadyExists { path } => {
        write!(f, "Configuration already exists: {}", path.display())
      }
      ConfigError::InvalidField { field, reason } => {
        write!(f, "Invalid value for `{}`: {}", field, reason)
      }
      ConfigError::InvalidSchedule { expression, reason } => {
        write!(f, "Invalid schedule '{}': {}", expression, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Revision does not resolve to a commit
  CommitNotFound { rev: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run inside the checked-out source tree or pass --sha explicitly (looked in {}).",
        path.display()
      )),
      GitError::CommitNotFound { .. } => Some("Fetch the commit first (actions/checkout with fetch-depth: 0) or pass --sha.".to_string()),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::CommitNotFound { rev } => {
        write!(f, "Revision does not name a commit: {}", rev)
      }
    }
  }
}

/// Trigger context errors
#[derive(Debug)]
pub enum TriggerError {
  /// The event cannot start this pipeline
  UnsupportedEvent { event: String, pipeline: String },

  /// A required identifier is absent
  MissingValue { field: String },

  /// Commit SHA is not 7-40 hex characters
  InvalidSha { sha: String },

  /// Pull-request number is not a decimal number
  InvalidPrNumber { value: String },

  /// Resolved tag violates the OCI tag grammar
  InvalidTag { tag: String },

  /// Actor is empty after sanitization
  InvalidActor { actor: String },
}

impl TriggerError {
  fn help_message(&self) -> Option<String> {
    match self {
      TriggerError::UnsupportedEvent { pipeline, .. } => Some(match pipeline.as_str() {
        "release" => "The release publisher runs on `release` and `workflow_dispatch` events.".to_string(),
        _ => "The PR image builder runs on `pull_request` and `schedule` events.".to_string(),
      }),
      TriggerError::MissingValue { field } => Some(format!(
        "Pass --{} or run inside GitHub Actions where it is provided by the environment.",
        field
      )),
      TriggerError::InvalidSha { .. } => Some("Pass a full or abbreviated hex commit id, e.g. --sha abc1234def.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for TriggerError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TriggerError::UnsupportedEvent { event, pipeline } => {
        write!(f, "Event '{}' does not trigger the {} pipeline", event, pipeline)
      }
      TriggerError::MissingValue { field } => write!(f, "Missing trigger value: {}", field),
      TriggerError::InvalidSha { sha } => write!(f, "Invalid commit id '{}'", sha),
      TriggerError::InvalidPrNumber { value } => write!(f, "Invalid pull-request number '{}'", value),
      TriggerError::InvalidTag { tag } => write!(f, "'{}' is not a valid image tag", tag),
      TriggerError::InvalidActor { actor } => write!(f, "Actor '{}' is empty after sanitization", actor),
    }
  }
}

/// Container engine errors
#[derive(Debug)]
pub enum EngineError {
  /// Engine binary could not be spawned
  Spawn { program: String, reason: String },

  /// A pipeline step exited unsuccessfully
  StepFailed { step: String, code: Option<i32> },

  /// Registry token variable is unset or empty
  MissingToken { var: String },
}

impl EngineError {
  fn help_message(&self) -> Option<String> {
    match self {
      EngineError::Spawn { program, .. } => Some(format!(
        "Install {} or set `image.engine` in pipeline.toml. Run `image-pipeline doctor` to diagnose.",
        program
      )),
      EngineError::StepFailed { step, .. } if step == "login" => {
        Some("Check that the registry token has `write:packages` scope.".to_string())
      }
      EngineError::StepFailed { .. } => None,
      EngineError::MissingToken { var } => Some(format!("Export {} with a registry token before publishing.", var)),
    }
  }
}

impl fmt::Display for EngineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EngineError::Spawn { program, reason } => write!(f, "Failed to run {}: {}", program, reason),
      EngineError::StepFailed { step, code } => match code {
        Some(code) => write!(f, "Step '{}' failed with exit code {}", step, code),
        None => write!(f, "Step '{}' was terminated by a signal", step),
      },
      EngineError::MissingToken { var } => write!(f, "Registry token not found in ${}", var),
    }
  }
}

/// Result type alias for image-pipeline
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> PipelineResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> PipelineResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<PipelineError>,
{
  fn context(self, ctx: impl Into<String>) -> PipelineResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> PipelineResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &PipelineError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
