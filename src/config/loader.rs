//! Configuration file loading and parsing.

use crate::errors::Error;
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration loaded from TOML file. Empty strings and zero values mean
/// "not set"; provider and store names are validated during merge.
#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub chat_model: String,

    #[serde(default)]
    pub embedding_model: String,

    #[serde(default)]
    pub embedding_dims: usize,

    #[serde(default)]
    pub store: String,

    #[serde(default)]
    pub database_path: PathBuf,

    #[serde(default)]
    pub default_collection: String,

    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,

    #[serde(default)]
    pub search_endpoint: String,

    #[serde(default)]
    pub search_api_key: String,
}

fn default_min_relevance() -> f64 {
    0.0
}

/// Load configuration from TOML file.
pub fn load_from_file() -> Result<Option<ConfigFile>, Error> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_dir = dirs::config_dir().unwrap_or_else(|| home.join(".config"));

    let config_path = config_dir.join("muisti/config.toml");

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {e}",
                config_path.display()
            ))
        })?;

        let config: ConfigFile = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file {}: {e}",
                config_path.display()
            ))
        })?;

        Ok(Some(config))
    } else {
        Ok(None)
    }
}
