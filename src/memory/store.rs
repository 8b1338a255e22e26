//! Core semantic memory struct combining embedding generation and storage.

use crate::embedding::Embedder;
use crate::errors::Error;
use crate::store::VectorStore;

/// Maximum allowed input length (100,000 characters).
pub const MAX_INPUT_LENGTH: usize = 100_000;

/// High-level semantic memory over a vector store and an embedding provider.
///
/// Texts are embedded on save and on recall; similarity ranking happens in
/// whichever backend the store wraps. Both seams are trait objects so tests
/// can run without a network or a database file.
pub struct SemanticMemory {
    pub(crate) store: Box<dyn VectorStore>,
    pub(crate) embedder: Box<dyn Embedder>,
}

impl SemanticMemory {
    pub fn new(store: Box<dyn VectorStore>, embedder: Box<dyn Embedder>) -> Self {
        SemanticMemory { store, embedder }
    }

    /// Validate input length (rejects empty and whitespace-only inputs).
    pub(crate) fn validate_input_length(text: &str) -> Result<(), Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        if text.len() > MAX_INPUT_LENGTH {
            return Err(Error::InputTooLong {
                max_length: MAX_INPUT_LENGTH,
                actual_length: text.len(),
            });
        }
        Ok(())
    }
}
