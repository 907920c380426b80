//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use calendly_etl_core::TracingOutputFormat;

use crate::config::SecretBackend;

/// calendly-etl - Extract Calendly scheduled events into CSV tables
#[derive(Debug, Parser)]
#[command(name = "calendly-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALENDLY_ETL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log output format (pretty, compact, json)
    #[arg(long, env = "CALENDLY_ETL_LOG_FORMAT")]
    pub log_format: Option<TracingOutputFormat>,

    /// Trigger payload as a JSON document
    #[arg(long)]
    pub payload: Option<String>,

    /// Request identifier attached to the run's logs
    #[arg(long)]
    pub request_id: Option<String>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Settings that override the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Destination bucket
    #[arg(long, env = "CALENDLY_ETL_BUCKET")]
    pub bucket: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, env = "CALENDLY_ETL_FOLDER")]
    pub folder: Option<String>,

    /// Name of the API credentials secret
    #[arg(long, env = "CALENDLY_SECRET_NAME")]
    pub secret_name: Option<String>,

    /// Region label for the secret and storage services
    #[arg(long, env = "CALENDLY_ETL_REGION")]
    pub region: Option<String>,

    /// Secret store backend
    #[arg(long, value_enum, env = "CALENDLY_ETL_SECRET_BACKEND")]
    pub secret_backend: Option<SecretBackend>,

    /// Directory of the file secret backend
    #[arg(long, env = "CALENDLY_ETL_SECRETS_DIR")]
    pub secrets_dir: Option<PathBuf>,

    /// Root directory of the local object store
    #[arg(long, env = "CALENDLY_ETL_STORAGE_ROOT")]
    pub storage_root: Option<PathBuf>,

    /// Calendly API base URL
    #[arg(long, env = "CALENDLY_API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// Page size for collection requests (1-100)
    #[arg(long, env = "CALENDLY_ETL_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CALENDLY_ETL_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Recency filter (pass-through, exclude-past, exclude-upcoming)
    #[arg(long, env = "CALENDLY_ETL_RECENCY_FILTER")]
    pub recency_filter: Option<String>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Dump,
    /// Check the effective configuration
    Validate,
    /// Show the configuration file path
    Path,
}
