//! Configuration system for muisti.

mod env_parser;
mod loader;
mod overrides;
mod paths;
mod validation;

#[cfg(test)]
mod tests_utils;
#[cfg(test)]
use tests_utils::ENV_MUTEX;

use crate::errors::Error;
use std::path::PathBuf;
use std::str::FromStr;

pub use loader::ConfigFile;

/// Model service provider for embeddings and chat completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    AzureOpenAi,
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "azure-openai" | "azure_openai" => Ok(Provider::AzureOpenAi),
            other => Err(Error::Config(format!(
                "Unknown provider: {other} (expected 'openai' or 'azure-openai')"
            ))),
        }
    }
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::AzureOpenAi => "azure-openai",
        }
    }
}

/// Vector store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
    AzureSearch,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            "azure-search" | "azure_search" => Ok(StoreBackend::AzureSearch),
            other => Err(Error::Config(format!(
                "Unknown store backend: {other} (expected 'sqlite', 'memory' or 'azure-search')"
            ))),
        }
    }
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Memory => "memory",
            StoreBackend::AzureSearch => "azure-search",
        }
    }
}

/// Configuration values with priority: defaults < config file < env vars.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model service provider.
    pub provider: Provider,

    /// API key for the selected provider.
    pub api_key: Option<String>,

    /// Provider endpoint. Required for Azure OpenAI; defaults to the
    /// public OpenAI API otherwise.
    pub endpoint: Option<String>,

    /// API version query parameter for Azure OpenAI requests.
    pub api_version: String,

    /// Chat model or deployment name.
    pub chat_model: String,

    /// Embedding model or deployment name.
    pub embedding_model: String,

    /// Embedding vector dimensions.
    pub embedding_dims: usize,

    /// Vector store backend.
    pub store: StoreBackend,

    /// Path to the SQLite database (sqlite backend only).
    pub database_path: PathBuf,

    /// Default collection name for CLI operations.
    pub default_collection: String,

    /// Minimum relevance score for recall results.
    pub min_relevance: f64,

    /// Azure AI Search endpoint (azure-search backend only).
    pub search_endpoint: Option<String>,

    /// Azure AI Search admin key (azure-search backend only).
    pub search_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        // Use home directory with sensible fallback for systems without HOME
        let home = dirs::home_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        let muisti_dir = home.join(".muisti");

        Self {
            provider: Provider::OpenAi,
            api_key: None,
            endpoint: None,
            api_version: "2024-06-01".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dims: 1536,
            store: StoreBackend::Sqlite,
            database_path: muisti_dir.join("memories.db"),
            default_collection: "memories".to_string(),
            min_relevance: 0.0,
            search_endpoint: None,
            search_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration with defaults, file values, and environment overrides.
    pub fn load() -> Result<Self, Error> {
        let file_config = loader::load_from_file()?;

        let mut config = Config::default();

        if let Some(mut file) = file_config {
            paths::expand_tilde(&mut file.database_path);
            config.merge_from_file(file)?;
        }

        overrides::apply_env_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Merge configuration from a file into this config.
    fn merge_from_file(&mut self, file: ConfigFile) -> Result<(), Error> {
        if !file.provider.is_empty() {
            self.provider = file.provider.parse()?;
        }
        if !file.api_key.is_empty() {
            self.api_key = Some(file.api_key);
        }
        if !file.endpoint.is_empty() {
            self.endpoint = Some(file.endpoint);
        }
        if !file.api_version.is_empty() {
            self.api_version = file.api_version;
        }
        if !file.chat_model.is_empty() {
            self.chat_model = file.chat_model;
        }
        if !file.embedding_model.is_empty() {
            self.embedding_model = file.embedding_model;
        }
        if file.embedding_dims > 0 {
            self.embedding_dims = file.embedding_dims;
        }
        if !file.store.is_empty() {
            self.store = file.store.parse()?;
        }
        if !file.database_path.as_os_str().is_empty() {
            self.database_path = file.database_path;
        }
        if !file.default_collection.is_empty() {
            self.default_collection = file.default_collection;
        }
        self.min_relevance = file.min_relevance;
        if !file.search_endpoint.is_empty() {
            self.search_endpoint = Some(file.search_endpoint);
        }
        if !file.search_api_key.is_empty() {
            self.search_api_key = Some(file.search_api_key);
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), Error> {
        let validator = validation::ConfigValidator {
            provider: self.provider,
            endpoint: self.endpoint.clone(),
            api_version: self.api_version.clone(),
            chat_model: self.chat_model.clone(),
            embedding_model: self.embedding_model.clone(),
            embedding_dims: self.embedding_dims,
            store: self.store,
            database_path: self.database_path.clone(),
            min_relevance: self.min_relevance,
            search_endpoint: self.search_endpoint.clone(),
            search_api_key: self.search_api_key.clone(),
        };

        validator.validate()
    }

    /// Ensure the parent directory for the database path exists.
    pub fn ensure_directories(&self) -> Result<(), Error> {
        if self.store != StoreBackend::Sqlite {
            return Ok(());
        }
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }
        Ok(())
    }
}
