//! calendly-etl CLI entry point.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use calendly_etl::cli::{Cli, Command, ConfigAction};
use calendly_etl::config::EtlConfig;
use calendly_etl::error::{CliError, CliResult};
use calendly_etl::handler::{InvocationContext, Pipeline, handle};
use calendly_etl_core::{RunTimestamp, TracingConfig, TracingOutputFormat, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(tracing_config(&cli)) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn tracing_config(cli: &Cli) -> TracingConfig {
    let base = if cli.debug {
        TracingConfig::debug()
    } else if cli.log_format == Some(TracingOutputFormat::Json) {
        TracingConfig::scheduled()
    } else {
        TracingConfig::default()
    };

    match cli.log_format {
        Some(format) => base.with_format(format),
        None => base,
    }
}

async fn run(cli: Cli) -> CliResult<ExitCode> {
    let source = cli.config.clone().unwrap_or_else(EtlConfig::default_path);
    let mut config = match cli.config {
        Some(ref path) => EtlConfig::load_from(path)?,
        None => EtlConfig::load()?,
    };
    config.apply(&cli.overrides);

    match cli.command {
        Some(Command::Config { action }) => {
            match action {
                ConfigAction::Dump => calendly_etl::commands::config::dump(&config, &source)?,
                ConfigAction::Validate => calendly_etl::commands::config::validate(&config)?,
                ConfigAction::Path => calendly_etl::commands::config::path(&source)?,
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            let payload = match cli.payload {
                Some(ref raw) => {
                    serde_json::from_str(raw).map_err(|e| CliError::Payload(e.to_string()))?
                }
                None => serde_json::Value::Object(Default::default()),
            };
            let context = InvocationContext {
                request_id: cli.request_id.clone(),
            };

            tracing::info!(
                bucket = %config.bucket,
                region = %config.region,
                secret = %config.secret_name,
                "configuration loaded"
            );
            let pipeline = Pipeline::from_config(&config)?;
            let response = handle(&pipeline, &payload, &context, RunTimestamp::now()).await;

            let json = serde_json::to_string(&response)
                .map_err(|e| CliError::Config(format!("failed to serialize response: {}", e)))?;
            writeln!(std::io::stdout(), "{}", json)?;

            Ok(if response.status_code == 200 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
