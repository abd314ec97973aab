//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<ClientConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<ClientConfig> {
    let config: ClientConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    // Same normalization as every other source
    let config = config
        .clone()
        .with_dataset_url(&config.dataset_url)
        .context("Invalid dataset_url")?;

    Ok(config)
}

/// Merge CLI arguments (which already carry environment values) with the
/// file configuration; CLI takes precedence
pub fn merge_cli_with_config(cli: &Cli, mut config: ClientConfig) -> Result<ClientConfig> {
    if let Some(url) = &cli.dataset {
        config = config.with_dataset_url(url)?;
    }
    if let Some(token) = cli.token.as_ref().filter(|t| !t.is_empty()) {
        config.token = Some(token.clone());
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(secs) = cli.cache_timeout {
        config.cache_timeout_secs = secs;
    }
    if let Some(ms) = cli.http_timeout_ms {
        config.http.timeout_ms = ms;
    }

    Ok(config)
}

/// Resolve the effective configuration for a CLI invocation
pub fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let base = match &cli.config {
        Some(path) => parse_toml_file(path)?,
        None => ClientConfig::default(),
    };
    merge_cli_with_config(cli, base)
}
