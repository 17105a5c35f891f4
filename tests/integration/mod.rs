//! Integration tests for image-pipeline
//!
//! Each test runs the compiled binary in a temporary git repository whose
//! pipeline.toml points at a shell script standing in for docker.

#![cfg(unix)]

mod helpers;
mod test_commands;
mod test_pr;
mod test_release;
