//! CLI, configuration and the run handler.
//!
//! This crate provides the `calendly-etl` command-line interface. Each
//! invocation performs one extract run and prints the invocation response.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod handler;

pub use cli::Cli;
pub use config::EtlConfig;
pub use error::{CliError, CliResult};
pub use handler::{
    InvocationContext, InvocationResponse, Pipeline, RunOutcome, RunSummary, handle, invoke,
};
