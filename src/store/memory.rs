//! In-process vector store backed by a HashMap.
//!
//! Useful for tests and for sessions that do not need persistence. Records
//! are held per collection; search is a linear cosine scan over everything
//! in the collection.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{validate_limit, vector, Error, Record, Result, VectorStore};

struct StoredRecord {
    record: Record,
    embedding: Vec<f32>,
}

/// Volatile vector store, one HashMap per collection.
pub struct InMemoryStore {
    dims: usize,
    collections: HashMap<String, HashMap<String, StoredRecord>>,
}

impl InMemoryStore {
    pub fn new(dims: usize) -> Self {
        InMemoryStore {
            dims,
            collections: HashMap::new(),
        }
    }

    fn collection(&self, name: &str) -> Result<&HashMap<String, StoredRecord>> {
        self.collections
            .get(name)
            .ok_or_else(|| Error::CollectionMissing(name.to_string()))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut HashMap<String, StoredRecord>> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| Error::CollectionMissing(name.to_string()))
    }
}

impl VectorStore for InMemoryStore {
    fn ensure_collection(&mut self, collection: &str) -> Result<()> {
        self.collections
            .entry(collection.to_string())
            .or_default();
        Ok(())
    }

    fn collection_exists(&self, collection: &str) -> Result<bool> {
        Ok(self.collections.contains_key(collection))
    }

    fn drop_collection(&mut self, collection: &str) -> Result<()> {
        self.collections.remove(collection);
        Ok(())
    }

    fn upsert(
        &mut self,
        collection: &str,
        id: Option<&str>,
        text: &str,
        embedding: &[f32],
        metadata: Option<&str>,
    ) -> Result<String> {
        if embedding.len() != self.dims {
            return Err(Error::MismatchedDimensions {
                expected: self.dims,
                actual: embedding.len(),
            });
        }

        let records = self.collection_mut(collection)?;
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now().to_rfc3339();

        // Replacing an existing record keeps its original creation time.
        let created_at = records
            .get(&id)
            .map(|existing| existing.record.created_at.clone())
            .unwrap_or_else(|| now.clone());

        records.insert(
            id.clone(),
            StoredRecord {
                record: Record {
                    id: id.clone(),
                    collection: collection.to_string(),
                    text: text.to_string(),
                    metadata: metadata.map(str::to_string),
                    relevance: None,
                    created_at,
                    updated_at: now,
                },
                embedding: embedding.to_vec(),
            },
        );

        Ok(id)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        let records = self.collection(collection)?;
        Ok(records.get(id).map(|stored| stored.record.clone()))
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<bool> {
        let records = self.collection_mut(collection)?;
        Ok(records.remove(id).is_some())
    }

    fn list(&self, collection: &str, limit: usize) -> Result<Vec<Record>> {
        validate_limit(limit)?;
        let records = self.collection(collection)?;

        let mut out: Vec<Record> = records.values().map(|s| s.record.clone()).collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit);
        Ok(out)
    }

    fn search(&self, collection: &str, embedding: &[f32], limit: usize) -> Result<Vec<Record>> {
        validate_limit(limit)?;
        let records = self.collection(collection)?;

        let mut results: Vec<Record> = Vec::with_capacity(records.len());
        for stored in records.values() {
            let similarity = vector::cosine_similarity(embedding, &stored.embedding)?;
            let mut record = stored.record.clone();
            record.relevance = Some(similarity);
            results.push(record);
        }

        results.sort_by(|a, b| {
            b.relevance
                .unwrap_or(0.0)
                .partial_cmp(&a.relevance.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        results.truncate(limit);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::new(4);
        store.ensure_collection("notes").unwrap();
        store
    }

    #[test]
    fn test_upsert_and_get() {
        let mut store = store();
        let id = store
            .upsert("notes", None, "water boils at 100C", &[0.1; 4], None)
            .unwrap();

        let record = store.get("notes", &id).unwrap().unwrap();
        assert_eq!(record.text, "water boils at 100C");
        assert_eq!(record.collection, "notes");
        assert!(record.relevance.is_none());
    }

    #[test]
    fn test_upsert_with_id_replaces() {
        let mut store = store();
        let id = store
            .upsert("notes", Some("fact-1"), "original", &[0.1; 4], None)
            .unwrap();
        assert_eq!(id, "fact-1");
        let first = store.get("notes", "fact-1").unwrap().unwrap();

        store
            .upsert("notes", Some("fact-1"), "revised", &[0.2; 4], None)
            .unwrap();
        let second = store.get("notes", "fact-1").unwrap().unwrap();

        assert_eq!(second.text, "revised");
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn test_upsert_wrong_dimensions() {
        let mut store = store();
        let result = store.upsert("notes", None, "text", &[0.1; 3], None);
        assert!(matches!(
            result,
            Err(Error::MismatchedDimensions { .. })
        ));
    }

    #[test]
    fn test_unensured_collection_is_an_error() {
        let mut store = InMemoryStore::new(4);
        let result = store.upsert("missing", None, "text", &[0.1; 4], None);
        assert!(matches!(result, Err(Error::CollectionMissing(_))));
        assert!(!store.collection_exists("missing").unwrap());
    }

    #[test]
    fn test_drop_collection_is_idempotent() {
        let mut store = store();
        store.drop_collection("notes").unwrap();
        store.drop_collection("notes").unwrap();
        assert!(!store.collection_exists("notes").unwrap());
    }

    #[test]
    fn test_delete() {
        let mut store = store();
        let id = store
            .upsert("notes", None, "text", &[0.1; 4], None)
            .unwrap();

        assert!(store.delete("notes", &id).unwrap());
        assert!(!store.delete("notes", &id).unwrap());
        assert!(store.get("notes", &id).unwrap().is_none());
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let mut store = store();
        store
            .upsert("notes", Some("x"), "x axis", &[1.0, 0.0, 0.0, 0.0], None)
            .unwrap();
        store
            .upsert("notes", Some("y"), "y axis", &[0.0, 1.0, 0.0, 0.0], None)
            .unwrap();

        let results = store
            .search("notes", &[0.9, 0.1, 0.0, 0.0], 10)
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "x");
        assert!(results[0].relevance.unwrap() > results[1].relevance.unwrap());
    }

    #[test]
    fn test_search_respects_limit() {
        let mut store = store();
        for i in 0..5 {
            store
                .upsert("notes", None, &format!("note {}", i), &[0.1; 4], None)
                .unwrap();
        }

        let results = store.search("notes", &[0.1; 4], 2).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_collection_isolation() {
        let mut store = store();
        store.ensure_collection("other").unwrap();
        store
            .upsert("notes", None, "in notes", &[0.1; 4], None)
            .unwrap();

        let results = store.list("other", 10).unwrap();
        assert!(results.is_empty());
    }
}
