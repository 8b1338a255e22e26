//! Vector storage backends for muisti.
//!
//! This module provides:
//! - `Record`: Data structure for stored memories
//! - `VectorStore`: Common interface over the backends
//! - `sqlite`: Persistent local storage with embedding BLOBs
//! - `memory`: In-process storage for tests and ephemeral use
//! - `azure`: Azure AI Search index backend
//! - `vector`: BLOB conversion and cosine similarity

pub mod azure;
pub mod memory;
pub mod sqlite;
pub mod vector;

pub use self::azure::AzureSearchStore;
pub use self::memory::InMemoryStore;
pub use self::sqlite::SqliteStore;

/// A single stored record with metadata and optional similarity score.
#[derive(Clone, Debug)]
pub struct Record {
    pub id: String,
    pub collection: String,
    pub text: String,
    pub metadata: Option<String>,

    /// Cosine similarity against the query (0.0-1.0, higher = better match).
    /// Only set on search results.
    pub relevance: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Error types for storage operations.
#[derive(Debug)]
pub enum Error {
    Backend(String),
    InvalidBlobSize { expected: usize, actual: usize },
    MismatchedDimensions { expected: usize, actual: usize },
    EmptyVector,
    InvalidEmbedding(String),
    InvalidLimit(String),
    CollectionMissing(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Backend(msg) => write!(f, "Storage error: {}", msg),
            Error::InvalidBlobSize { expected, actual } => {
                write!(
                    f,
                    "Invalid BLOB size: expected {} bytes, got {} bytes",
                    expected, actual
                )
            }
            Error::MismatchedDimensions { expected, actual } => {
                write!(
                    f,
                    "Mismatched dimensions: expected {} dimensions, got {} dimensions",
                    expected, actual
                )
            }
            Error::EmptyVector => write!(f, "Cannot compute similarity with empty vector"),
            Error::InvalidEmbedding(msg) => write!(f, "Invalid embedding: {}", msg),
            Error::InvalidLimit(msg) => write!(f, "Invalid limit: {}", msg),
            Error::CollectionMissing(name) => {
                write!(f, "Collection does not exist: {}", name)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Backend(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of results a single search or list may request.
pub const MAX_SEARCH_LIMIT: usize = 10_000;

/// Validate search limit is within acceptable bounds.
pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::InvalidLimit(
            "Limit must be greater than 0".to_string(),
        ));
    }
    if limit > i64::MAX as usize || limit > MAX_SEARCH_LIMIT {
        return Err(Error::InvalidLimit(format!(
            "Limit {} exceeds maximum allowed ({})",
            limit, MAX_SEARCH_LIMIT
        )));
    }
    Ok(())
}

/// Common interface over the storage backends.
///
/// Collections must be created with `ensure_collection` before records are
/// written to them. Embeddings must match the dimensionality the store was
/// constructed with.
pub trait VectorStore: Send {
    /// Create the collection if it does not already exist.
    fn ensure_collection(&mut self, collection: &str) -> Result<()>;

    /// Whether the collection exists.
    fn collection_exists(&self, collection: &str) -> Result<bool>;

    /// Delete the collection and everything in it. Idempotent.
    fn drop_collection(&mut self, collection: &str) -> Result<()>;

    /// Insert or replace a record. When `id` is given an existing record with
    /// that id is overwritten, keeping its original creation time; otherwise
    /// a fresh id is generated. Returns the record's id.
    fn upsert(
        &mut self,
        collection: &str,
        id: Option<&str>,
        text: &str,
        embedding: &[f32],
        metadata: Option<&str>,
    ) -> Result<String>;

    /// Retrieve a single record by id, or None if absent.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Record>>;

    /// Delete a record by id. Returns true if a record was deleted.
    fn delete(&mut self, collection: &str, id: &str) -> Result<bool>;

    /// List records ordered by creation time, newest first.
    fn list(&self, collection: &str, limit: usize) -> Result<Vec<Record>>;

    /// Rank records by cosine similarity against the query embedding,
    /// highest first, returning at most `limit` results.
    fn search(&self, collection: &str, embedding: &[f32], limit: usize) -> Result<Vec<Record>>;
}
