//! Recall operations for the semantic memory.

use crate::errors::Error;
use crate::store::{validate_limit, Record};

use super::store::SemanticMemory;

/// Validate a relevance threshold: finite, within 0.0..=1.0.
fn validate_min_relevance(min_relevance: f64) -> Result<(), Error> {
    if !min_relevance.is_finite() {
        return Err(Error::InvalidInput(
            "Minimum relevance must be a finite number".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&min_relevance) {
        return Err(Error::InvalidInput(format!(
            "Minimum relevance must be between 0.0 and 1.0, got {}",
            min_relevance
        )));
    }
    Ok(())
}

impl SemanticMemory {
    #[must_use = "handle the error or results may be lost"]
    /// Recall memories by semantic similarity.
    ///
    /// Generates an embedding for the query, ranks the collection by cosine
    /// similarity, and drops results whose relevance is below `min_relevance`.
    ///
    /// # Arguments
    ///
    /// * `collection` - Collection to search within
    /// * `query` - Search query text (1 to 100,000 characters)
    /// * `limit` - Maximum number of results to return
    /// * `min_relevance` - Relevance floor (0.0 keeps everything)
    ///
    /// # Returns
    ///
    /// Records sorted by relevance (highest first), each with its
    /// `relevance` score set.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Query is empty or exceeds 100,000 characters
    /// - Limit is 0 or exceeds MAX_SEARCH_LIMIT
    /// - Minimum relevance is not a finite value in 0.0..=1.0
    /// - Embedding generation fails
    /// - The storage backend fails
    pub fn recall(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance: f64,
    ) -> Result<Vec<Record>, Error> {
        validate_limit(limit)?;

        let query = query.trim();
        Self::validate_input_length(query)?;
        validate_min_relevance(min_relevance)?;

        let embedding = self.embedder.embed(query)?;
        let records = self.store.search(collection, &embedding, limit)?;

        Ok(records
            .into_iter()
            .filter(|r| r.relevance.unwrap_or(0.0) >= min_relevance)
            .collect())
    }
}
