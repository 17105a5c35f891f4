//! CLI commands for image-pipeline
//!
//! ## Pipelines
//! - **release**: build, log in and push `ghcr.io/<namespace>/<name>:<short sha>`
//! - **pr**: build `ghcr.io/<actor>/<name>:<pr number>` without pushing
//!
//! ## Inspection & Setup
//! - **tag**: print the tag and image reference a pipeline would use
//! - **schedule**: show when the PR image builder's schedule fires
//! - **init**: write a default pipeline.toml
//! - **doctor**: check that git, the container engine and config are usable
//!
//! Pipeline and inspection commands take `&PipelineContext`; init and doctor
//! run on the bare workspace root since the config may be missing or broken.

pub mod doctor;
pub mod init;
pub mod pr;
pub mod release;
pub mod schedule;
pub mod tag;

pub use doctor::run_doctor;
pub use init::run_init;
pub use pr::run_pr;
pub use release::run_release;
pub use schedule::run_schedule;
pub use tag::run_tag;
