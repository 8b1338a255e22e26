//! Shared test utilities for config module tests.

use std::sync::Mutex;

/// Mutex to serialize environment variable tests and prevent race conditions.
pub static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// All environment variables consulted by the config system.
pub const ALL_ENV_VARS: &[&str] = &[
    "MUISTI_PROVIDER",
    "MUISTI_API_KEY",
    "MUISTI_ENDPOINT",
    "MUISTI_API_VERSION",
    "MUISTI_CHAT_MODEL",
    "MUISTI_EMBEDDING_MODEL",
    "MUISTI_EMBEDDING_DIMS",
    "MUISTI_STORE",
    "MUISTI_DATABASE_PATH",
    "MUISTI_COLLECTION",
    "MUISTI_MIN_RELEVANCE",
    "MUISTI_SEARCH_URL",
    "MUISTI_SEARCH_API_KEY",
    "OPENAI_API_KEY",
    "AZURE_OPENAI_API_KEY",
];

/// Clean up environment variables used by muisti config.
pub fn cleanup_env_vars(vars: &[&str]) {
    for var in vars {
        #[allow(clippy::disallowed_methods)]
        std::env::remove_var(var);
    }
}
