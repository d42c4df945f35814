use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::{Source, SourceMetadata};

/// Persisted document-vector store backed by SQLite with the sqlite-vec
/// extension. Passages live in a plain table; their embeddings live in a
/// vec0 virtual table keyed by the same rowid.
pub struct DocumentStore {
    db: Arc<Mutex<Connection>>,
    dimensions: usize,
}

impl DocumentStore {
    pub fn open(path: &Path, dimensions: usize) -> Result<Self> {
        // Register sqlite-vec as an auto-loading extension. Safe to call
        // more than once.
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path)?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                page INTEGER,
                origin TEXT
            )",
            [],
        )?;

        // Virtual tables don't support IF NOT EXISTS, so check manually.
        let table_exists: bool = db
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='vec_documents'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .unwrap_or(false);

        if !table_exists {
            db.execute(
                &format!(
                    "CREATE VIRTUAL TABLE vec_documents USING vec0(
                        document_id INTEGER PRIMARY KEY,
                        embedding FLOAT[{}] distance_metric=cosine
                    )",
                    dimensions
                ),
                [],
            )?;
        }

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            dimensions,
        })
    }

    /// Insert a passage with its precomputed embedding. Returns the new id.
    pub async fn add_document(
        &self,
        content: &str,
        page: Option<u32>,
        origin: Option<&str>,
        embedding: &[f32],
    ) -> Result<i64> {
        if embedding.len() != self.dimensions {
            return Err(anyhow!(
                "embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.dimensions
            ));
        }

        let db = self.db.lock().await;

        db.execute(
            "INSERT INTO documents (content, page, origin) VALUES (?1, ?2, ?3)",
            params![content, page, origin],
        )?;
        let id = db.last_insert_rowid();

        let embedding_blob: Vec<u8> = embedding.iter().flat_map(|f| f.to_le_bytes()).collect();
        db.execute(
            "INSERT INTO vec_documents (document_id, embedding) VALUES (?1, ?2)",
            params![id, &embedding_blob],
        )?;

        Ok(id)
    }

    /// Nearest-neighbour search. Returns up to `top_k` passages ordered by
    /// ascending cosine distance, optionally constrained to one origin
    /// document. Similarity is reported as `1 - distance`, clamped to [0,1].
    pub async fn search(
        &self,
        embedding: &[f32],
        origin_filter: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<Source>> {
        if embedding.len() != self.dimensions {
            return Err(anyhow!(
                "query embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.dimensions
            ));
        }

        let query_blob: Vec<u8> = embedding.iter().flat_map(|f| f.to_le_bytes()).collect();

        let db = self.db.lock().await;

        let origin_clause = if origin_filter.is_some() {
            "AND d.origin = ?3"
        } else {
            ""
        };

        let sql = format!(
            "SELECT d.id, d.content, d.page, d.origin, v.distance
             FROM documents d
             JOIN (
                 SELECT document_id, distance
                 FROM vec_documents
                 WHERE embedding MATCH ?1
                 ORDER BY distance
                 LIMIT ?2
             ) v ON d.id = v.document_id
             WHERE 1=1 {}
             ORDER BY v.distance",
            origin_clause
        );

        let mut stmt = db.prepare(&sql)?;

        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<Source> {
            let distance: f64 = row.get(4)?;
            Ok(Source {
                id: row.get(0)?,
                content: row.get(1)?,
                metadata: SourceMetadata {
                    page: row.get(2)?,
                    origin: row.get(3)?,
                },
                similarity: (1.0 - distance as f32).clamp(0.0, 1.0),
            })
        };

        let sources = if let Some(origin) = origin_filter {
            stmt.query_map(params![&query_blob, top_k as i64, origin], map_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![&query_blob, top_k as i64], map_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store(dir: &tempfile::TempDir) -> DocumentStore {
        DocumentStore::open(&dir.path().join("documents.sqlite"), 4).unwrap()
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        let near = store
            .add_document("calcium", Some(67), Some("nutrition.pdf"), &[1.0, 0.0, 0.0, 0.0])
            .await
            .unwrap();
        let mid = store
            .add_document("iron", Some(71), Some("nutrition.pdf"), &[0.8, 0.6, 0.0, 0.0])
            .await
            .unwrap();
        let far = store
            .add_document("zinc", Some(74), Some("nutrition.pdf"), &[0.0, 0.0, 1.0, 0.0])
            .await
            .unwrap();

        let hits = store
            .search(&[1.0, 0.0, 0.0, 0.0], None, 5)
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, near);
        assert_eq!(hits[1].id, mid);
        assert_eq!(hits[2].id, far);
        assert!(hits[0].similarity > 0.99);
        assert!(hits[0].similarity <= 1.0);
        assert!(hits[1].similarity > hits[2].similarity);
        assert_eq!(hits[0].metadata.page, Some(67));
        assert_eq!(hits[0].metadata.origin.as_deref(), Some("nutrition.pdf"));
    }

    #[tokio::test]
    async fn test_origin_filter_excludes_other_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        store
            .add_document("a", None, Some("nutrition.pdf"), &[1.0, 0.0, 0.0, 0.0])
            .await
            .unwrap();
        store
            .add_document("b", None, Some("other.pdf"), &[1.0, 0.0, 0.0, 0.0])
            .await
            .unwrap();

        let hits = store
            .search(&[1.0, 0.0, 0.0, 0.0], Some("nutrition.pdf"), 5)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.origin.as_deref(), Some("nutrition.pdf"));
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        for i in 0..4 {
            let x = 1.0 - (i as f32) * 0.1;
            store
                .add_document(&format!("doc {}", i), None, None, &[x, 0.1 * i as f32, 0.0, 0.0])
                .await
                .unwrap();
        }

        let hits = store.search(&[1.0, 0.0, 0.0, 0.0], None, 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store.add_document("x", None, None, &[1.0, 2.0]).await.is_err());
        assert!(store.search(&[1.0, 2.0], None, 5).await.is_err());
    }

    #[tokio::test]
    async fn test_reopen_keeps_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("documents.sqlite");

        let store = DocumentStore::open(&path, 4).unwrap();
        store
            .add_document("persisted", Some(1), None, &[0.0, 1.0, 0.0, 0.0])
            .await
            .unwrap();
        drop(store);

        let store = DocumentStore::open(&path, 4).unwrap();
        let hits = store.search(&[0.0, 1.0, 0.0, 0.0], None, 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "persisted");
    }
}
