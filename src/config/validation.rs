//! Configuration validation logic.

use crate::errors::Error;
use std::path::PathBuf;

use super::{Provider, StoreBackend};

/// Validates configuration values.
pub struct ConfigValidator {
    pub provider: Provider,
    pub endpoint: Option<String>,
    pub api_version: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dims: usize,
    pub store: StoreBackend,
    pub database_path: PathBuf,
    pub min_relevance: f64,
    pub search_endpoint: Option<String>,
    pub search_api_key: Option<String>,
}

impl ConfigValidator {
    /// Validate all configuration values for correctness and constraints.
    ///
    /// Checks that:
    /// - Minimum relevance is finite and between 0.0 and 1.0
    /// - Embedding dimensions are non-zero
    /// - Model names and the API version are not empty
    /// - Azure OpenAI has an endpoint
    /// - The sqlite backend has a database path
    /// - The azure-search backend has an endpoint and key
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_min_relevance()?;
        self.validate_embedding()?;
        self.validate_models()?;
        self.validate_provider()?;
        self.validate_store()?;

        Ok(())
    }

    fn validate_min_relevance(&self) -> Result<(), Error> {
        if self.min_relevance.is_nan() || self.min_relevance.is_infinite() {
            return Err(Error::Config(
                "Invalid minimum relevance: NaN and infinity are not allowed".into(),
            ));
        }

        if self.min_relevance < 0.0 || self.min_relevance > 1.0 {
            return Err(Error::Config(format!(
                "Invalid minimum relevance: {} (must be between 0.0 and 1.0)",
                self.min_relevance
            )));
        }

        Ok(())
    }

    fn validate_embedding(&self) -> Result<(), Error> {
        if self.embedding_dims == 0 {
            return Err(Error::Config(
                "Embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_models(&self) -> Result<(), Error> {
        if self.chat_model.trim().is_empty() {
            return Err(Error::Config("Chat model cannot be empty".to_string()));
        }
        if self.embedding_model.trim().is_empty() {
            return Err(Error::Config("Embedding model cannot be empty".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(Error::Config("API version cannot be empty".to_string()));
        }

        Ok(())
    }

    fn validate_provider(&self) -> Result<(), Error> {
        if self.provider == Provider::AzureOpenAi {
            match &self.endpoint {
                Some(endpoint) if !endpoint.trim().is_empty() => {}
                _ => {
                    return Err(Error::Config(
                        "Azure OpenAI requires an endpoint (set MUISTI_ENDPOINT)".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }

    fn validate_store(&self) -> Result<(), Error> {
        match self.store {
            StoreBackend::Sqlite => {
                if self.database_path.as_os_str().is_empty() {
                    return Err(Error::Config("Database path cannot be empty".to_string()));
                }
            }
            StoreBackend::AzureSearch => {
                match &self.search_endpoint {
                    Some(endpoint) if !endpoint.trim().is_empty() => {}
                    _ => {
                        return Err(Error::Config(
                            "Azure AI Search requires an endpoint (set MUISTI_SEARCH_URL)"
                                .to_string(),
                        ))
                    }
                }
                match &self.search_api_key {
                    Some(key) if !key.trim().is_empty() => {}
                    _ => {
                        return Err(Error::Config(
                            "Azure AI Search requires an API key (set MUISTI_SEARCH_API_KEY)"
                                .to_string(),
                        ))
                    }
                }
            }
            StoreBackend::Memory => {}
        }

        Ok(())
    }
}
