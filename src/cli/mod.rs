//! CLI module
//!
//! Command-line interface for running extraction jobs.
//!
//! # Commands
//!
//! - `run` - Extract an endpoint and upload the output
//! - `validate` - Check a job file offline
//! - `endpoints` - List supported endpoints
//! - `schema` - Show an endpoint's output schema

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::{endpoints_listing, load_job, Overrides, Runner};
