//! SQLite vector store with embedding BLOBs.
//!
//! Records live in a single `records` table keyed by (id, collection), with
//! embeddings serialized as little-endian f32 BLOBs. Similarity ranking is
//! done in-process with a cosine scan over the collection.

use std::path::{Component, Path};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use uuid::Uuid;

use super::vector::{blob_to_vec, cosine_similarity, vec_to_blob};
use super::{validate_limit, Error, Record, Result, VectorStore};

/// Persistent vector store backed by SQLite.
pub struct SqliteStore {
    conn: Connection,
    dims: usize,
}

/// Initialize database schema.
fn create_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS records (
            id TEXT NOT NULL,
            collection TEXT NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (id, collection)
        );

        CREATE INDEX IF NOT EXISTS idx_records_collection ON records(collection);
        "#,
    )?;
    Ok(())
}

/// Reject paths that climb out of their base directory.
fn validate_path(path: &Path) -> Result<()> {
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(Error::Backend(format!(
            "Database path must not contain '..': {}",
            path.display()
        )));
    }
    Ok(())
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    ///
    /// Initializes the schema if the database is new.
    ///
    /// # Errors
    ///
    /// Returns error if the path contains parent-directory components, or if
    /// the database cannot be opened or schema initialization fails.
    pub fn open(path: &Path, dims: usize) -> Result<Self> {
        validate_path(path)?;
        let mut conn = Connection::open(path)?;
        create_schema(&mut conn)?;
        Ok(Self { conn, dims })
    }

    fn require_collection(&self, collection: &str) -> Result<()> {
        if !self.collection_exists(collection)? {
            return Err(Error::CollectionMissing(collection.to_string()));
        }
        Ok(())
    }

    fn record_rows(&self, collection: &str) -> Result<Vec<(Record, Vec<u8>)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, collection, text, metadata, created_at, updated_at, embedding
            FROM records
            WHERE collection = ?1
            "#,
        )?;

        let rows: SqliteResult<Vec<(Record, Vec<u8>)>> = stmt
            .query_map([collection], |row| {
                Ok((
                    Record {
                        id: row.get(0)?,
                        collection: row.get(1)?,
                        text: row.get(2)?,
                        metadata: row.get(3)?,
                        relevance: None,
                        created_at: row.get(4)?,
                        updated_at: row.get(5)?,
                    },
                    row.get::<_, Vec<u8>>(6)?,
                ))
            })?
            .collect();

        Ok(rows?)
    }
}

impl VectorStore for SqliteStore {
    fn ensure_collection(&mut self, collection: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![collection, &now],
        )?;
        Ok(())
    }

    fn collection_exists(&self, collection: &str) -> Result<bool> {
        let exists: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM collections WHERE name = ?1",
                [collection],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    fn drop_collection(&mut self, collection: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM records WHERE collection = ?1", [collection])?;
        self.conn
            .execute("DELETE FROM collections WHERE name = ?1", [collection])?;
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
        self.require_collection(collection)?;

        let blob = vec_to_blob(embedding, self.dims)?;
        let now = Utc::now().to_rfc3339();
        let id = id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Replace in place so an existing record keeps its created_at.
        let rows = self.conn.execute(
            r#"
            UPDATE records
            SET text = ?1, embedding = ?2, metadata = ?3, updated_at = ?4
            WHERE id = ?5 AND collection = ?6
            "#,
            params![text, &blob, metadata, &now, &id, collection],
        )?;

        if rows == 0 {
            self.conn.execute(
                r#"
                INSERT INTO records (id, collection, text, embedding, metadata, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![&id, collection, text, &blob, metadata, &now, &now],
            )?;
        }

        Ok(id)
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        self.require_collection(collection)?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, collection, text, metadata, created_at, updated_at
            FROM records
            WHERE id = ?1 AND collection = ?2
            "#,
        )?;

        let result = stmt
            .query_row(params![id, collection], |row| {
                Ok(Record {
                    id: row.get(0)?,
                    collection: row.get(1)?,
                    text: row.get(2)?,
                    metadata: row.get(3)?,
                    relevance: None,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            })
            .optional()?;

        Ok(result)
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<bool> {
        self.require_collection(collection)?;

        let rows = self.conn.execute(
            "DELETE FROM records WHERE id = ?1 AND collection = ?2",
            params![id, collection],
        )?;
        Ok(rows > 0)
    }

    fn list(&self, collection: &str, limit: usize) -> Result<Vec<Record>> {
        validate_limit(limit)?;
        self.require_collection(collection)?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, collection, text, metadata, created_at, updated_at
            FROM records
            WHERE collection = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )?;

        let records: SqliteResult<Vec<Record>> = stmt
            .query_map(params![collection, limit as i64], |row| {
                Ok(Record {
                    id: row.get(0)?,
                    collection: row.get(1)?,
                    text: row.get(2)?,
                    metadata: row.get(3)?,
                    relevance: None,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            })?
            .collect();

        Ok(records?)
    }

    fn search(&self, collection: &str, embedding: &[f32], limit: usize) -> Result<Vec<Record>> {
        validate_limit(limit)?;
        self.require_collection(collection)?;

        let mut results: Vec<Record> = Vec::new();
        for (mut record, blob) in self.record_rows(collection)? {
            let stored = blob_to_vec(&blob, self.dims)?;
            record.relevance = Some(cosine_similarity(embedding, &stored)?);
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
