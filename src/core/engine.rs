//! Container engine invocations (docker, podman)
//!
//! Commands are described as [`Invocation`] values first so a plan can be
//! printed, hashed and executed by any [`CommandRunner`].

use crate::core::error::{EngineError, PipelineError, PipelineResult};
use crate::core::image::ImageRef;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
}

impl Invocation {
  pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }

  /// Shell-like rendering for plans and logs
  pub fn display(&self) -> String {
    let mut rendered = self.program.clone();
    for arg in &self.args {
      rendered.push(' ');
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        rendered.push_str(&format!("'{}'", arg));
      } else {
        rendered.push_str(arg);
      }
    }
    rendered
  }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
  pub code: Option<i32>,
}

impl CommandOutcome {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Runs invocations; `stdin` carries secrets so they never reach argv
pub trait CommandRunner {
  fn run(&self, invocation: &Invocation, stdin: Option<&SecretString>) -> PipelineResult<CommandOutcome>;
}

/// Runs invocations as child processes; their output goes to stderr so stdout
/// stays reserved for plans and reports
pub struct SystemRunner {
  cwd: PathBuf,
}

impl SystemRunner {
  pub fn new(cwd: &Path) -> Self {
    Self { cwd: cwd.to_path_buf() }
  }
}

impl CommandRunner for SystemRunner {
  fn run(&self, invocation: &Invocation, stdin: Option<&SecretString>) -> PipelineResult<CommandOutcome> {
    let spawn_error = |reason: String| {
      PipelineError::Engine(EngineError::Spawn {
        program: invocation.program.clone(),
        reason,
      })
    };

    let mut cmd = Command::new(&invocation.program);
    cmd.current_dir(&self.cwd).args(&invocation.args);
    cmd.stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() });
    cmd.stdout(std::io::stderr());

    let mut child = cmd.spawn().map_err(|e| spawn_error(e.to_string()))?;

    if let Some(secret) = stdin
      && let Some(mut pipe) = child.stdin.take()
    {
      // A child that exits before reading stdin surfaces through its exit code
      if let Err(e) = pipe.write_all(secret.expose_secret().as_bytes()) {
        tracing::warn!(program = %invocation.program, error = %e, "failed to write stdin");
      }
    }

    let status = child.wait().map_err(|e| spawn_error(e.to_string()))?;
    Ok(CommandOutcome { code: status.code() })
  }
}

/// Builds engine command lines
pub struct ContainerEngine {
  program: String,
}

impl ContainerEngine {
  pub fn new(program: impl Into<String>) -> Self {
    Self { program: program.into() }
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  /// `<engine> build --file <dockerfile> --tag <image> <context>`
  pub fn build(&self, image: &ImageRef, dockerfile: &Path, context: &Path) -> Invocation {
    Invocation::new(
      &self.program,
      [
        "build".to_string(),
        "--file".to_string(),
        dockerfile.to_string_lossy().to_string(),
        "--tag".to_string(),
        image.to_string(),
        context.to_string_lossy().to_string(),
      ],
    )
  }

  /// `<engine> login <registry> --username <user> --password-stdin`
  pub fn login(&self, registry: &str, username: &str) -> Invocation {
    Invocation::new(
      &self.program,
      ["login", registry, "--username", username, "--password-stdin"],
    )
  }

  /// `<engine> push <image>`
  pub fn push(&self, image: &ImageRef) -> Invocation {
    Invocation::new(&self.program, ["push".to_string(), image.to_string()])
  }
}
