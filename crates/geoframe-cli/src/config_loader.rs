//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use geoframe_core::config::{parse_match_policy, parse_validity_mode, CliConfigOverrides, LayeredConfig};

use crate::cli::Cli;

/// Collect the global flags that override configuration
pub fn overrides_from_cli(cli: &Cli) -> Result<CliConfigOverrides> {
    Ok(CliConfigOverrides {
        left_suffix: cli.left_suffix.clone(),
        right_suffix: cli.right_suffix.clone(),
        match_policy: cli.match_policy.as_deref().map(parse_match_policy).transpose()?,
        snap_tolerance: cli.snap_tolerance,
        spatial_index: cli.no_index.then_some(false),
        geometry_validity: cli.geometry_validity.as_deref().map(parse_validity_mode).transpose()?,
    })
}

/// Load layered configuration: defaults, file, environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();
    let config = match &cli.config {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => config.load_default_file().context("Failed to load geoframe.toml")?,
    };

    let mut config = config.load_from_env();
    config.update_from_cli(overrides_from_cli(cli)?);
    Ok(config)
}
