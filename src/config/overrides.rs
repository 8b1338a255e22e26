//! Environment variable overrides for configuration.

use crate::errors::Error;

use super::env_parser::{
    env_var, parse_env_float, parse_env_path, parse_env_string, parse_env_usize,
};
use super::{Config, Provider};

#[cfg(test)]
use super::tests_utils::ENV_MUTEX;

/// Apply environment variable overrides to configuration.
///
/// The provider selector is applied first so the API key fallback chain can
/// consult the resolved provider.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), Error> {
    if let Some(val) = env_var("MUISTI_PROVIDER") {
        config.provider = parse_env_string("MUISTI_PROVIDER", &val)?.parse()?;
    }

    apply_api_key_override(config)?;

    if let Some(val) = env_var("MUISTI_ENDPOINT") {
        config.endpoint = Some(parse_env_string("MUISTI_ENDPOINT", &val)?);
    }
    if let Some(val) = env_var("MUISTI_API_VERSION") {
        config.api_version = parse_env_string("MUISTI_API_VERSION", &val)?;
    }
    if let Some(val) = env_var("MUISTI_CHAT_MODEL") {
        config.chat_model = parse_env_string("MUISTI_CHAT_MODEL", &val)?;
    }
    if let Some(val) = env_var("MUISTI_EMBEDDING_MODEL") {
        config.embedding_model = parse_env_string("MUISTI_EMBEDDING_MODEL", &val)?;
    }
    if let Some(val) = env_var("MUISTI_EMBEDDING_DIMS") {
        config.embedding_dims = parse_env_usize("MUISTI_EMBEDDING_DIMS", &val)?;
    }
    if let Some(val) = env_var("MUISTI_STORE") {
        config.store = parse_env_string("MUISTI_STORE", &val)?.parse()?;
    }
    if let Some(val) = env_var("MUISTI_DATABASE_PATH") {
        config.database_path = parse_env_path("MUISTI_DATABASE_PATH", &val)?;
    }
    if let Some(val) = env_var("MUISTI_COLLECTION") {
        config.default_collection = parse_env_string("MUISTI_COLLECTION", &val)?;
    }
    if let Some(val) = env_var("MUISTI_MIN_RELEVANCE") {
        config.min_relevance = parse_env_float("MUISTI_MIN_RELEVANCE", &val)?;
    }
    if let Some(val) = env_var("MUISTI_SEARCH_URL") {
        config.search_endpoint = Some(parse_env_string("MUISTI_SEARCH_URL", &val)?);
    }
    if let Some(val) = env_var("MUISTI_SEARCH_API_KEY") {
        config.search_api_key = Some(parse_env_string("MUISTI_SEARCH_API_KEY", &val)?);
    }

    Ok(())
}

/// API key resolution: `MUISTI_API_KEY` wins, then the conventional
/// provider-specific variable for the resolved provider.
fn apply_api_key_override(config: &mut Config) -> Result<(), Error> {
    if let Some(val) = env_var("MUISTI_API_KEY") {
        config.api_key = Some(parse_env_string("MUISTI_API_KEY", &val)?);
        return Ok(());
    }

    let fallback = match config.provider {
        Provider::OpenAi => "OPENAI_API_KEY",
        Provider::AzureOpenAi => "AZURE_OPENAI_API_KEY",
    };
    if let Some(val) = env_var(fallback) {
        if !val.trim().is_empty() {
            config.api_key = Some(val);
        }
    }
    Ok(())
}
