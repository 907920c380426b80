//! Configuration commands.

use std::path::Path;

use crate::config::EtlConfig;
use crate::error::{CliError, CliResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &EtlConfig, source: &Path) -> CliResult<()> {
    println!("{}", render(config, source)?);
    Ok(())
}

/// Renders the effective configuration as commented TOML.
pub fn render(config: &EtlConfig, source: &Path) -> CliResult<String> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    Ok(format!("# config.toml ({})\n{}", source.display(), toml_str))
}

/// Validate the configuration.
pub fn validate(config: &EtlConfig) -> CliResult<()> {
    config.validate()?;
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(source: &Path) -> CliResult<()> {
    println!("config: {}", source.display());
    Ok(())
}
