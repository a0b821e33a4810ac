//! # Configuration Loader
//!
//! Reads a TOML file and maps it onto [`ScalingConfig`]. Pure data loading:
//! no validation, and missing sections are left to the DTO defaults.

use std::path::Path;

use anyhow::Context;
use nf_core::ScalingConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Fails when the file cannot be read, is not TOML, or does not map onto
/// the configuration structure (for example an unknown direction).
pub fn load_config(config_path: &Path) -> anyhow::Result<ScalingConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    ScalingConfig::from_toml(&toml_value).context("Failed to map config")
}
