//! Log subscriber setup.
//!
//! The binary installs one subscriber before a run starts. Events go to
//! stderr so that stdout only carries the invocation response.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Crates whose events the default filter lets through.
const LOG_TARGETS: &[&str] = &["calendly_etl", "calendly_etl_core", "calendly_etl_providers"];

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    Pretty,
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for TracingOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{}`", other)),
        }
    }
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the workspace crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Adds target, file and line to every event.
    pub verbose: bool,
    /// Emits a close event with busy/idle timings for each span.
    pub span_timings: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Compact,
            verbose: false,
            span_timings: false,
        }
    }
}

impl TracingConfig {
    /// `--debug`: debug level with source locations.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            verbose: true,
            ..Self::default()
        }
    }

    /// Unattended runs shipping JSON to a log collector.
    #[must_use]
    pub fn scheduled() -> Self {
        Self {
            format: TracingOutputFormat::Json,
            span_timings: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    fn default_directive(&self) -> String {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Installs the global subscriber. `RUST_LOG`, when set, replaces the
/// default directive.
///
/// # Errors
///
/// Fails if a subscriber is already installed or `RUST_LOG` does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive)?,
        _ => EnvFilter::try_new(config.default_directive())?,
    };

    let span_events = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.verbose)
        .with_file(config.verbose)
        .with_line_number(config.verbose)
        .with_span_events(span_events);

    let layer = match config.format {
        TracingOutputFormat::Pretty => layer.pretty().boxed(),
        TracingOutputFormat::Compact => layer.compact().boxed(),
        TracingOutputFormat::Json => layer.json().boxed(),
    };

    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(filter).with(layer))?;
    Ok(())
}
