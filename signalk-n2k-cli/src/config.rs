//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use signalk_n2k::BridgeConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Encoder selection and timing
    #[serde(flatten)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Delta file to read instead of stdin
    pub file: Option<PathBuf>,
    /// Keep running timers after the input ends
    #[serde(default)]
    pub keep_alive: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// File to append wire lines to instead of stdout
    pub file: Option<PathBuf>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .bridge
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

/// Parse a `--battery` argument of the form `<signalk id>:<instance>`
pub fn parse_battery_arg(arg: &str) -> Result<(String, u32)> {
    let (id, instance) = arg
        .rsplit_once(':')
        .with_context(|| format!("Expected <signalk id>:<instance>, got '{}'", arg))?;
    let instance = instance
        .trim()
        .parse::<u32>()
        .with_context(|| format!("Invalid battery instance in '{}'", arg))?;
    Ok((id.trim().to_string(), instance))
}
