//! muisti - A semantic memory layer for AI applications.
//!
//! This crate embeds texts through OpenAI or Azure OpenAI, stores them in a
//! vector-backed collection (SQLite, in-memory, or Azure AI Search), and
//! recalls them by cosine similarity. All operations are synchronous
//! (no async/await required).
//!
//! # Example
//!
//! ```no_run
//! use muisti::{Config, HttpEmbeddingClient, InMemoryStore, SemanticMemory};
//!
//! let config = Config::load().expect("Failed to load configuration");
//! let embedder = HttpEmbeddingClient::from_config(&config)
//!     .expect("Failed to configure embedding provider");
//!
//! let mut memory = SemanticMemory::new(
//!     Box::new(InMemoryStore::new(config.embedding_dims)),
//!     Box::new(embedder),
//! );
//!
//! // Save a memory
//! let id = memory
//!     .save("notes", None, "Alice works at Microsoft", None)
//!     .expect("Failed to save");
//! println!("Saved memory: {}", id);
//!
//! // Recall by meaning, not keywords
//! let results = memory
//!     .recall("notes", "where does alice work", 5, 0.0)
//!     .expect("Failed to recall");
//! for record in results {
//!     println!("{:.2}: {}", record.relevance.unwrap_or(0.0), record.text);
//! }
//! ```

pub mod chat;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod memory;
pub mod store;
pub mod template;

mod http;

// Re-export public API
pub use chat::{ChatClient, ChatCompleter};
pub use config::{Config, Provider, StoreBackend};
pub use embedding::{Embedder, HttpEmbeddingClient};
pub use errors::Error;
pub use memory::store::MAX_INPUT_LENGTH;
pub use memory::{Answer, SemanticMemory};
pub use store::{
    AzureSearchStore, InMemoryStore, Record, SqliteStore, VectorStore, MAX_SEARCH_LIMIT,
};
pub use template::{render, GROUNDED_ANSWER_TEMPLATE};
