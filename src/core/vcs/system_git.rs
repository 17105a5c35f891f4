//! System git backend
//!
//! Only revision lookups are needed: the runner has already checked out the
//! source, so the tool never writes to the repository.

use crate::core::error::{GitError, PipelineError, PipelineResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using the system `git` binary
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> PipelineResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(PipelineError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(PipelineError::Git(GitError::CommandFailed {
        command: format!("git -C {} rev-parse --show-toplevel", path.display()),
        stderr: stderr.to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Resolve a revision (branch, tag, `HEAD`, abbreviated SHA) to a full commit SHA
  pub fn resolve_commit(&self, rev: &str) -> PipelineResult<String> {
    let spec = format!("{}^{{commit}}", rev);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &spec])
      .output()
      .context("Failed to resolve revision")?;

    if !output.status.success() {
      return Err(PipelineError::Git(GitError::CommitNotFound { rev: rev.to_string() }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Abbreviated, repository-unique form of a revision (`git rev-parse --short=<len>`)
  ///
  /// Git may return more than `len` characters when the prefix is ambiguous.
  pub fn short_commit(&self, rev: &str, len: usize) -> PipelineResult<String> {
    let full = self.resolve_commit(rev)?;
    let short_arg = format!("--short={}", len);
    let output = self
      .git_cmd()
      .args(["rev-parse", &short_arg, &full])
      .output()
      .context("Failed to abbreviate commit")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(PipelineError::Git(GitError::CommandFailed {
        command: format!("git rev-parse {} {}", short_arg, full),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}
