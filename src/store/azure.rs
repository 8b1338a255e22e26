//! Azure AI Search vector store.
//!
//! Each collection maps to a search index with an HNSW cosine vector profile.
//! Documents carry the record fields plus the embedding as a
//! `Collection(Edm.Single)` field.

use serde_json::{json, Value};

use crate::config::Config;
use crate::http::{HttpClient, HttpError};

use super::{validate_limit, Error, Record, Result, VectorStore};

const API_VERSION: &str = "2024-07-01";

/// Remote vector store backed by an Azure AI Search service.
pub struct AzureSearchStore {
    http: HttpClient,
    endpoint: String,
    api_key: String,
    dims: usize,
}

fn backend_err(err: HttpError) -> Error {
    Error::Backend(err.to_string())
}

fn is_not_found(err: &HttpError) -> bool {
    matches!(err, HttpError::Status { status: 404, .. })
}

/// Index schema for a collection with the given embedding dimensionality.
fn index_definition(name: &str, dims: usize) -> Value {
    json!({
        "name": name,
        "fields": [
            { "name": "id", "type": "Edm.String", "key": true, "filterable": true },
            { "name": "text", "type": "Edm.String", "searchable": true },
            { "name": "metadata", "type": "Edm.String", "searchable": false },
            { "name": "created_at", "type": "Edm.String", "sortable": true },
            { "name": "updated_at", "type": "Edm.String", "sortable": true },
            {
                "name": "embedding",
                "type": "Collection(Edm.Single)",
                "searchable": true,
                "dimensions": dims,
                "vectorSearchProfile": "default-profile"
            }
        ],
        "vectorSearch": {
            "algorithms": [
                { "name": "default-hnsw", "kind": "hnsw", "hnswParameters": { "metric": "cosine" } }
            ],
            "profiles": [
                { "name": "default-profile", "algorithm": "default-hnsw" }
            ]
        }
    })
}

/// Build a `Record` from an Azure search document.
fn record_from_doc(doc: &Value, collection: &str) -> Result<Record> {
    let field = |name: &str| -> Result<String> {
        doc.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Backend(format!("Search document missing field: {}", name)))
    };

    Ok(Record {
        id: field("id")?,
        collection: collection.to_string(),
        text: field("text")?,
        metadata: doc
            .get("metadata")
            .and_then(Value::as_str)
            .map(str::to_string),
        relevance: doc.get("@search.score").and_then(Value::as_f64),
        created_at: field("created_at")?,
        updated_at: field("updated_at")?,
    })
}

impl AzureSearchStore {
    /// Construct a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the search endpoint or API key is missing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = config.search_endpoint.clone().ok_or_else(|| {
            Error::Backend("Azure AI Search requires an endpoint (set MUISTI_SEARCH_URL)".to_string())
        })?;
        let api_key = config.search_api_key.clone().ok_or_else(|| {
            Error::Backend(
                "Azure AI Search requires an API key (set MUISTI_SEARCH_API_KEY)".to_string(),
            )
        })?;

        Ok(AzureSearchStore {
            http: HttpClient::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            dims: config.embedding_dims,
        })
    }

    fn index_url(&self, collection: &str) -> String {
        format!(
            "{}/indexes/{}?api-version={}",
            self.endpoint, collection, API_VERSION
        )
    }

    fn docs_index_url(&self, collection: &str) -> String {
        format!(
            "{}/indexes/{}/docs/index?api-version={}",
            self.endpoint, collection, API_VERSION
        )
    }

    fn docs_search_url(&self, collection: &str) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, collection, API_VERSION
        )
    }

    fn doc_lookup_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/indexes/{}/docs/{}?api-version={}",
            self.endpoint, collection, id, API_VERSION
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![("api-key", self.api_key.as_str())]
    }

    /// Distinguishes a missing index from a missing document: document
    /// lookups also answer 404 when the index itself does not exist.
    fn require_collection(&self, collection: &str) -> Result<()> {
        if !self.collection_exists(collection)? {
            return Err(Error::CollectionMissing(collection.to_string()));
        }
        Ok(())
    }

    fn lookup(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let result: crate::http::Result<Value> = self.http.send_json(
            "GET",
            &self.doc_lookup_url(collection, id),
            &self.headers(),
            None::<&Value>,
        );
        match result {
            Ok(doc) => Ok(Some(doc)),
            Err(err) if is_not_found(&err) => Ok(None),
            Err(err) => Err(backend_err(err)),
        }
    }

    fn query(&self, collection: &str, body: &Value) -> Result<Vec<Record>> {
        let response: Value = self
            .http
            .send_json("POST", &self.docs_search_url(collection), &self.headers(), Some(body))
            .map_err(backend_err)?;

        let docs = response
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Backend("Search response missing `value` array".to_string()))?;

        docs.iter()
            .map(|doc| record_from_doc(doc, collection))
            .collect()
    }
}

impl VectorStore for AzureSearchStore {
    fn ensure_collection(&mut self, collection: &str) -> Result<()> {
        // createOrUpdate, so re-ensuring an existing index is a no-op.
        self.http
            .send(
                "PUT",
                &self.index_url(collection),
                &self.headers(),
                Some(&index_definition(collection, self.dims)),
            )
            .map_err(backend_err)?;
        Ok(())
    }

    fn collection_exists(&self, collection: &str) -> Result<bool> {
        match self
            .http
            .send("GET", &self.index_url(collection), &self.headers(), None::<&Value>)
        {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => Ok(false),
            Err(err) => Err(backend_err(err)),
        }
    }

    fn drop_collection(&mut self, collection: &str) -> Result<()> {
        match self
            .http
            .send("DELETE", &self.index_url(collection), &self.headers(), None::<&Value>)
        {
            Ok(_) => Ok(()),
            Err(err) if is_not_found(&err) => Ok(()),
            Err(err) => Err(backend_err(err)),
        }
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
        self.require_collection(collection)?;

        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let now = chrono::Utc::now().to_rfc3339();

        // Replacing an existing document keeps its original creation time.
        let created_at = self
            .lookup(collection, &id)?
            .and_then(|doc| {
                doc.get("created_at")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| now.clone());

        let body = json!({
            "value": [{
                "@search.action": "mergeOrUpload",
                "id": id,
                "text": text,
                "metadata": metadata,
                "created_at": created_at,
                "updated_at": now,
                "embedding": embedding,
            }]
        });

        self.http
            .send("POST", &self.docs_index_url(collection), &self.headers(), Some(&body))
            .map_err(backend_err)?;

        Ok(id)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        self.require_collection(collection)?;
        match self.lookup(collection, id)? {
            Some(doc) => Ok(Some(record_from_doc(&doc, collection)?)),
            None => Ok(None),
        }
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<bool> {
        self.require_collection(collection)?;
        if self.lookup(collection, id)?.is_none() {
            return Ok(false);
        }

        let body = json!({
            "value": [{ "@search.action": "delete", "id": id }]
        });
        self.http
            .send("POST", &self.docs_index_url(collection), &self.headers(), Some(&body))
            .map_err(backend_err)?;
        Ok(true)
    }

    fn list(&self, collection: &str, limit: usize) -> Result<Vec<Record>> {
        validate_limit(limit)?;
        self.require_collection(collection)?;
        let body = json!({
            "search": "*",
            "top": limit,
            "orderby": "created_at desc",
            "select": "id,text,metadata,created_at,updated_at",
        });
        self.query(collection, &body)
    }

    fn search(&self, collection: &str, embedding: &[f32], limit: usize) -> Result<Vec<Record>> {
        validate_limit(limit)?;
        self.require_collection(collection)?;
        if embedding.len() != self.dims {
            return Err(Error::MismatchedDimensions {
                expected: self.dims,
                actual: embedding.len(),
            });
        }

        let body = json!({
            "vectorQueries": [{
                "kind": "vector",
                "vector": embedding,
                "fields": "embedding",
                "k": limit,
            }],
            "top": limit,
            "select": "id,text,metadata,created_at,updated_at",
        });
        self.query(collection, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(endpoint: &str) -> AzureSearchStore {
        let mut config = Config::default();
        config.search_endpoint = Some(endpoint.to_string());
        config.search_api_key = Some("search-key".to_string());
        config.embedding_dims = 4;
        AzureSearchStore::from_config(&config).unwrap()
    }

    #[test]
    fn test_from_config_requires_endpoint_and_key() {
        let config = Config::default();
        assert!(AzureSearchStore::from_config(&config).is_err());

        let mut config = Config::default();
        config.search_endpoint = Some("https://svc.search.windows.net".to_string());
        assert!(AzureSearchStore::from_config(&config).is_err());
    }

    #[test]
    fn test_urls() {
        let store = test_store("https://svc.search.windows.net/");
        assert_eq!(
            store.index_url("notes"),
            "https://svc.search.windows.net/indexes/notes?api-version=2024-07-01"
        );
        assert_eq!(
            store.docs_search_url("notes"),
            "https://svc.search.windows.net/indexes/notes/docs/search?api-version=2024-07-01"
        );
        assert_eq!(
            store.doc_lookup_url("notes", "fact-1"),
            "https://svc.search.windows.net/indexes/notes/docs/fact-1?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_index_definition_shape() {
        let definition = index_definition("notes", 1536);
        assert_eq!(definition["name"], "notes");

        let embedding_field = definition["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "embedding")
            .unwrap();
        assert_eq!(embedding_field["type"], "Collection(Edm.Single)");
        assert_eq!(embedding_field["dimensions"], 1536);

        assert_eq!(
            definition["vectorSearch"]["algorithms"][0]["hnswParameters"]["metric"],
            "cosine"
        );
    }

    #[test]
    fn test_record_from_doc() {
        let doc = json!({
            "@search.score": 0.87,
            "id": "fact-1",
            "text": "water boils at 100C",
            "metadata": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
        });

        let record = record_from_doc(&doc, "notes").unwrap();
        assert_eq!(record.id, "fact-1");
        assert_eq!(record.collection, "notes");
        assert_eq!(record.metadata, None);
        assert_eq!(record.relevance, Some(0.87));
    }

    #[test]
    fn test_record_from_doc_missing_field() {
        let doc = json!({ "id": "fact-1" });
        assert!(matches!(
            record_from_doc(&doc, "notes"),
            Err(Error::Backend(_))
        ));
    }

    #[test]
    fn test_collection_exists_maps_404_to_false() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/indexes/notes?api-version=2024-07-01")
            .match_header("api-key", "search-key")
            .with_status(404)
            .create();

        let store = test_store(&server.url());
        assert!(!store.collection_exists("notes").unwrap());
    }

    #[test]
    fn test_search_parses_scores() {
        let mut server = mockito::Server::new();
        let _index = server
            .mock("GET", "/indexes/notes?api-version=2024-07-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"notes"}"#)
            .create();
        let _mock = server
            .mock("POST", "/indexes/notes/docs/search?api-version=2024-07-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"value":[{"@search.score":0.92,"id":"a","text":"hit","metadata":null,
                    "created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}]}"#,
            )
            .create();

        let store = test_store(&server.url());
        let results = store.search("notes", &[0.1; 4], 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].relevance, Some(0.92));
    }

    #[test]
    fn test_unensured_collection_is_an_error() {
        let mut server = mockito::Server::new();
        let _index = server
            .mock("GET", "/indexes/missing?api-version=2024-07-01")
            .with_status(404)
            .expect_at_least(4)
            .create();

        let mut store = test_store(&server.url());
        assert!(matches!(
            store.get("missing", "id"),
            Err(Error::CollectionMissing(_))
        ));
        assert!(matches!(
            store.delete("missing", "id"),
            Err(Error::CollectionMissing(_))
        ));
        assert!(matches!(
            store.list("missing", 10),
            Err(Error::CollectionMissing(_))
        ));
        assert!(matches!(
            store.search("missing", &[0.1; 4], 10),
            Err(Error::CollectionMissing(_))
        ));
    }
}
