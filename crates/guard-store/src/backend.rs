//! Persistence seam of the chunk store.
//!
//! [`ChunkBackend`] is what [`crate::ChunkStore`] needs from storage.
//! [`LibSqlChunkBackend`] is the production implementation; tests swap in
//! scripted backends to exercise failure paths.

use std::future::Future;

use chrono::Utc;
use guard_core::entities::RegulatoryChunk;
use libsql::Value;
use serde::Serialize;

use crate::GuardDb;
use crate::error::StoreError;
use crate::helpers::{decode_embedding, encode_embedding, parse_datetime, to_u64};

/// A window ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChunk {
    pub id: String,
    pub text: String,
    pub source_document: String,
    pub embedding: Vec<f32>,
}

/// Aggregate store figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub chunks: u64,
    pub sources: u64,
    /// Text bytes plus embedding bytes.
    pub approx_bytes: u64,
}

/// Storage operations needed by the chunk store.
pub trait ChunkBackend: Send + Sync {
    /// Insert unless a chunk with the same id exists. Returns `true` when a
    /// row was written. Must be a single atomic operation.
    fn insert_if_absent(
        &self,
        chunk: &NewChunk,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn contains(&self, id: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// All chunks, optionally limited to one source document, in `seq` order.
    ///
    /// Rows whose embedding blob cannot be decoded surface as
    /// [`StoreError::Corrupt`].
    fn scan(
        &self,
        source: Option<&str>,
    ) -> impl Future<Output = Result<Vec<RegulatoryChunk>, StoreError>> + Send;

    /// Delete everything. Returns the number of removed chunks.
    fn clear(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn stats(&self) -> impl Future<Output = Result<StoreStats, StoreError>> + Send;
}

/// libSQL-backed chunk storage.
#[derive(Clone)]
pub struct LibSqlChunkBackend {
    db: GuardDb,
}

impl LibSqlChunkBackend {
    #[must_use]
    pub const fn new(db: GuardDb) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn db(&self) -> &GuardDb {
        &self.db
    }
}

impl ChunkBackend for LibSqlChunkBackend {
    async fn insert_if_absent(&self, chunk: &NewChunk) -> Result<bool, StoreError> {
        let params = vec![
            Value::Text(chunk.id.clone()),
            Value::Text(chunk.text.clone()),
            Value::Text(chunk.source_document.clone()),
            Value::Blob(encode_embedding(&chunk.embedding)),
            Value::Integer(i64::try_from(chunk.embedding.len()).unwrap_or(i64::MAX)),
            Value::Text(Utc::now().to_rfc3339()),
        ];
        let written = self
            .db
            .conn()
            .execute(
                "INSERT INTO regulatory_chunks (id, text, source_document, embedding, dimension, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO NOTHING",
                libsql::params_from_iter(params),
            )
            .await?;
        Ok(written == 1)
    }

    async fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT 1 FROM regulatory_chunks WHERE id = ?1 LIMIT 1",
                [id],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    async fn scan(&self, source: Option<&str>) -> Result<Vec<RegulatoryChunk>, StoreError> {
        let (sql, params) = match source {
            Some(source) => (
                "SELECT seq, id, text, source_document, embedding, dimension, inserted_at
                 FROM regulatory_chunks WHERE source_document = ?1 ORDER BY seq",
                vec![Value::Text(source.to_string())],
            ),
            None => (
                "SELECT seq, id, text, source_document, embedding, dimension, inserted_at
                 FROM regulatory_chunks ORDER BY seq",
                Vec::new(),
            ),
        };

        let mut rows = self
            .db
            .conn()
            .query(sql, libsql::params_from_iter(params))
            .await?;
        let mut chunks = Vec::new();

        while let Some(row) = rows.next().await? {
            let id = row.get::<String>(1)?;
            let blob = row.get::<Vec<u8>>(4)?;
            let dimension = row.get::<i64>(5)?;

            let embedding = decode_embedding(&blob).ok_or_else(|| StoreError::Corrupt {
                id: id.clone(),
                reason: format!("embedding blob of {} bytes is not f32-aligned", blob.len()),
            })?;
            if i64::try_from(embedding.len()).ok() != Some(dimension) {
                return Err(StoreError::Corrupt {
                    id,
                    reason: format!(
                        "stored dimension {dimension} but blob holds {} values",
                        embedding.len()
                    ),
                });
            }

            chunks.push(RegulatoryChunk {
                seq: row.get::<i64>(0)?,
                id,
                text: row.get::<String>(2)?,
                source_document: row.get::<String>(3)?,
                embedding,
                inserted_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }

        Ok(chunks)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let removed = self
            .db
            .conn()
            .execute("DELETE FROM regulatory_chunks", ())
            .await?;
        tracing::info!(removed, "chunk store cleared");
        Ok(removed)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT COUNT(*),
                        COUNT(DISTINCT source_document),
                        COALESCE(SUM(LENGTH(CAST(text AS BLOB)) + LENGTH(embedding)), 0)
                 FROM regulatory_chunks",
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        Ok(StoreStats {
            chunks: to_u64(row.get::<i64>(0)?),
            sources: to_u64(row.get::<i64>(1)?),
            approx_bytes: to_u64(row.get::<i64>(2)?),
        })
    }
}
