mod commands;
mod core;
mod ui;

use crate::commands::tag::TagPipeline;
use crate::core::context::PipelineContext;
use crate::core::error::{PipelineError, print_error};
use crate::core::trigger::{EventKind, TriggerEnv, TriggerOverrides};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Build and publish the pyriemann-qiskit container image from CI triggers
#[derive(Parser)]
#[command(name = "image-pipeline")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
  #[arg(long, global = true)]
  log_level: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

/// Values normally read from the CI environment
#[derive(Args, Debug, Default)]
struct TriggerArgs {
  /// Event name (release, workflow_dispatch, pull_request, schedule); default: $GITHUB_EVENT_NAME
  #[arg(long)]
  event: Option<String>,
  /// Commit id of the triggering event; default: $GITHUB_SHA
  #[arg(long)]
  sha: Option<String>,
  /// Pull-request number; default: from the event payload
  #[arg(long)]
  pr_number: Option<String>,
  /// Triggering actor; default: $GITHUB_ACTOR
  #[arg(long)]
  actor: Option<String>,
  /// Pull-request base branch; default: from the event payload
  #[arg(long)]
  base_ref: Option<String>,
}

impl From<TriggerArgs> for TriggerOverrides {
  fn from(args: TriggerArgs) -> Self {
    TriggerOverrides {
      event: args.event,
      sha: args.sha,
      pr_number: args.pr_number,
      actor: args.actor,
      base_ref: args.base_ref,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Pipelines
  // ============================================================================
  /// Release publisher: build, log in and push under the short commit hash
  Release {
    #[command(flatten)]
    trigger: TriggerArgs,
    /// Revision to abbreviate; overrides the commit id from $GITHUB_SHA
    #[arg(long, conflicts_with = "sha")]
    rev: Option<String>,
    /// Show the plan without executing it
    #[arg(long)]
    dry_run: bool,
    /// Output plan or report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// PR image builder: build (never push) under the pull-request number
  Pr {
    #[command(flatten)]
    trigger: TriggerArgs,
    /// Show the plan without executing it
    #[arg(long)]
    dry_run: bool,
    /// Output plan or report in JSON format
    #[arg(long)]
    json: bool,
  },

  // ============================================================================
  // Inspection & Setup
  // ============================================================================
  /// Print the tag and image reference a pipeline would use
  Tag {
    /// Pipeline whose naming rules apply
    #[arg(value_enum)]
    pipeline: TagPipeline,
    #[command(flatten)]
    trigger: TriggerArgs,
    /// Revision to abbreviate; overrides the commit id from $GITHUB_SHA
    #[arg(long, conflicts_with = "sha")]
    rev: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show when the PR image builder's schedule fires
  Schedule {
    /// Number of upcoming fire times to list
    #[arg(long, default_value_t = 3)]
    next: usize,
    /// List fire times after this RFC 3339 instant (default: now)
    #[arg(long, conflicts_with = "at")]
    after: Option<String>,
    /// Check whether the schedule fires at this RFC 3339 instant
    #[arg(long)]
    at: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Write a default pipeline.toml
  Init {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },

  /// Check that git, the container engine and configuration are usable
  Doctor {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Level precedence: RUST_LOG, then --log-level, then the dispatch `logLevel` input, then info
fn init_logging(cli_level: Option<&str>) {
  let level = cli_level
    .map(str::to_string)
    .or_else(dispatch_log_level)
    .unwrap_or_else(|| "info".to_string());

  let (level, unknown) = match known_level(&level) {
    Some(level) => (level, None),
    None => ("info", Some(level)),
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();

  if let Some(unknown) = unknown {
    tracing::warn!(level = %unknown, "unknown log level, using info");
  }
}

fn dispatch_log_level() -> Option<String> {
  let env = TriggerEnv::from_process_env();
  let event = env.event_name.as_deref().map(EventKind::parse)?;
  if event != EventKind::WorkflowDispatch {
    return None;
  }
  env.payload().ok()?.inputs.map(|inputs| inputs.log_level)
}

/// Workflow inputs say `warning`; tracing says `warn`
fn normalize_level(level: &str) -> String {
  match level.trim().to_ascii_lowercase().as_str() {
    "warning" => "warn".to_string(),
    "critical" | "fatal" => "error".to_string(),
    other => other.to_string(),
  }
}

/// Map a level name onto one `EnvFilter` accepts as a bare level
fn known_level(level: &str) -> Option<&'static str> {
  match normalize_level(level).as_str() {
    "trace" => Some("trace"),
    "debug" => Some("debug"),
    "info" => Some("info"),
    "warn" => Some("warn"),
    "error" => Some("error"),
    "off" => Some("off"),
    _ => None,
  }
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.log_level.as_deref());

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let result = match cli.command {
    // Run before (or despite) a valid configuration
    Commands::Init { force } => commands::run_init(&workspace_root, force),
    Commands::Doctor { json } => commands::run_doctor(&workspace_root, json),

    command => match PipelineContext::build(&workspace_root) {
      Err(e) => Err(e),
      Ok(ctx) => match command {
        Commands::Release {
          trigger,
          rev,
          dry_run,
          json,
        } => commands::run_release(&ctx, trigger.into(), rev, dry_run, json),
        Commands::Pr { trigger, dry_run, json } => commands::run_pr(&ctx, trigger.into(), dry_run, json),
        Commands::Tag {
          pipeline,
          trigger,
          rev,
          json,
        } => commands::run_tag(&ctx, pipeline, trigger.into(), rev, json),
        Commands::Schedule { next, after, at, json } => commands::run_schedule(&ctx, next, after, at, json),
        // Handled above
        Commands::Init { .. } | Commands::Doctor { .. } => Ok(()),
      },
    },
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: PipelineError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
