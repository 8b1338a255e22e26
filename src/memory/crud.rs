//! CRUD operations for the semantic memory.

use crate::errors::Error;
use crate::store::{validate_limit, Record};

use super::store::SemanticMemory;

impl SemanticMemory {
    #[must_use = "handle the error or results may be lost"]
    /// Save a text into a collection, embedding it first.
    ///
    /// Creates the collection if it does not already exist. When `id` is
    /// given an existing record with that id is replaced (keeping its
    /// creation time); otherwise a fresh id is generated.
    ///
    /// # Arguments
    ///
    /// * `collection` - Collection name to save into
    /// * `id` - Optional stable identifier for upsert semantics
    /// * `text` - Text content to store (1 to 100,000 characters)
    /// * `metadata` - Optional JSON metadata string
    ///
    /// # Returns
    ///
    /// The id of the saved record.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Input is empty or whitespace-only
    /// - Input exceeds 100,000 characters
    /// - Embedding generation fails
    /// - The storage backend fails
    pub fn save(
        &mut self,
        collection: &str,
        id: Option<&str>,
        text: &str,
        metadata: Option<&str>,
    ) -> Result<String, Error> {
        Self::validate_input_length(text)?;
        let embedding = self.embedder.embed(text)?;
        self.store.ensure_collection(collection)?;
        Ok(self.store.upsert(collection, id, text, &embedding, metadata)?)
    }

    #[must_use = "handle the error or results may be lost"]
    /// Get a specific record by id.
    ///
    /// Returns `None` if the record doesn't exist.
    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, Error> {
        Ok(self.store.get(collection, id)?)
    }

    #[must_use = "handle the error or results may be lost"]
    /// List records in a collection, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Limit is 0
    /// - Limit exceeds MAX_SEARCH_LIMIT
    pub fn list(&self, collection: &str, limit: usize) -> Result<Vec<Record>, Error> {
        validate_limit(limit)?;
        Ok(self.store.list(collection, limit)?)
    }

    #[must_use = "handle the error or results may be lost"]
    /// Delete a record.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the record was deleted
    /// - `Ok(false)` if it didn't exist
    pub fn forget(&mut self, collection: &str, id: &str) -> Result<bool, Error> {
        Ok(self.store.delete(collection, id)?)
    }

    /// Create the collection if it does not already exist.
    pub fn ensure_collection(&mut self, collection: &str) -> Result<(), Error> {
        Ok(self.store.ensure_collection(collection)?)
    }

    /// Whether the collection exists.
    pub fn collection_exists(&self, collection: &str) -> Result<bool, Error> {
        Ok(self.store.collection_exists(collection)?)
    }

    /// Delete the collection and everything in it. Idempotent.
    pub fn drop_collection(&mut self, collection: &str) -> Result<(), Error> {
        Ok(self.store.drop_collection(collection)?)
    }
}
