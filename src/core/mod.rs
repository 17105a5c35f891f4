//! Core engine for image-pipeline
//!
//! - **config**: pipeline.toml parsing and validation
//! - **context**: run context shared by all commands
//! - **engine**: container engine invocations and the process runner
//! - **error**: error types with exit codes and help messages
//! - **executor**: sequential plan execution with halt-on-failure
//! - **image**: image references, tag grammar, actor sanitization
//! - **plan**: build/login/push plans with content-hash ids
//! - **schedule**: cron schedules for the PR image builder
//! - **tag**: tag resolution for both pipelines
//! - **trigger**: trigger detection from the CI environment
//! - **vcs**: git revision lookups (SystemGit)

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod executor;
pub mod image;
pub mod plan;
pub mod schedule;
pub mod tag;
pub mod trigger;
pub mod vcs;
