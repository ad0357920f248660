use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use ssq_core::ReaderOptions;
use ssq_core::printing::OutputOptions;
use std::path::Path;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ssq.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SsqConfig {
    pub output: OutputOptions,
    pub reader: ReaderOptions,
}

impl SsqConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }
}

pub fn load(path: Option<&Path>) -> Result<SsqConfig> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(SsqConfig::default());
            }
            default
        }
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = SsqConfig::from_toml(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!("Loaded config {}: {:?}", path.display(), config);
    Ok(config)
}
