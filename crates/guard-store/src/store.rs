//! Content-addressed regulatory chunk store.
//!
//! Ingestion splits a document into overlapping windows and identifies each
//! by the SHA-256 of its text. A window whose hash is already stored is
//! skipped before embedding, so re-ingesting a document (under any source id)
//! costs one lookup per window and writes nothing. New windows are persisted
//! with a single insert-if-absent statement, which keeps concurrent ingestion
//! of identical text down to one stored copy.
//!
//! Retrieval is brute-force cosine similarity over all stored vectors. Ties
//! break on shorter text, then on insertion order.

use std::cmp::Ordering;
use std::sync::{Mutex, PoisonError};

use guard_core::entities::{RegulatoryChunk, ScoredChunk};
use guard_core::retry::RetryConfig;
use guard_embeddings::{Embedder, EmbeddingError, cosine_similarity};
use serde::Serialize;

use crate::backend::{ChunkBackend, NewChunk, StoreStats};
use crate::error::StoreError;
use crate::helpers::content_id;
use crate::splitter::WindowConfig;

/// Result of one `ingest` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Windows produced from the document.
    pub windows: usize,
    /// Newly stored chunks.
    pub added: usize,
    /// Windows whose content was already stored.
    pub skipped: usize,
    /// Windows dropped after embedding retries were exhausted.
    pub failed: usize,
}

pub struct ChunkStore<B, E> {
    backend: B,
    embedder: Mutex<E>,
    windows: WindowConfig,
    retry: RetryConfig,
}

impl<B: ChunkBackend, E: Embedder> ChunkStore<B, E> {
    pub fn new(backend: B, embedder: E) -> Self {
        Self {
            backend,
            embedder: Mutex::new(embedder),
            windows: WindowConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub const fn with_windows(mut self, windows: WindowConfig) -> Self {
        self.windows = windows;
        self
    }

    /// Backoff schedule for failed embedding calls.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Split, deduplicate, embed and persist a document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the storage layer fails. Embedding failures
    /// are counted in [`IngestOutcome::failed`] and do not abort the call.
    pub async fn ingest(&self, text: &str, source_id: &str) -> Result<IngestOutcome, StoreError> {
        let windows = self.windows.split(text);
        let mut outcome = IngestOutcome {
            windows: windows.len(),
            ..IngestOutcome::default()
        };

        for window in windows {
            let id = content_id(&window);
            if self.backend.contains(&id).await? {
                outcome.skipped += 1;
                continue;
            }

            let embedding = match self.embed_with_retry(&window).await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(chunk = %id, source = source_id, error = %e, "embedding failed; window dropped");
                    outcome.failed += 1;
                    continue;
                }
            };

            let chunk = NewChunk {
                id,
                text: window,
                source_document: source_id.to_string(),
                embedding,
            };
            if self.backend.insert_if_absent(&chunk).await? {
                outcome.added += 1;
            } else {
                // Lost a race with a concurrent ingest of the same text.
                outcome.skipped += 1;
            }
        }

        tracing::info!(
            source = source_id,
            windows = outcome.windows,
            added = outcome.added,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "document ingested"
        );
        Ok(outcome)
    }

    /// The `k` chunks nearest to `text` across all sources.
    ///
    /// # Errors
    ///
    /// Only embedding failures are returned. Storage failures and corrupt
    /// rows are logged and yield an empty result.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embed_with_retry(text).await?;
        let chunks = match self.backend.scan(None).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(error = %e, "chunk scan failed; returning no context");
                return Ok(Vec::new());
            }
        };
        Ok(rank(&vector, chunks, k))
    }

    /// Like [`Self::query`], restricted to `source` when that document has
    /// any chunks, otherwise across all sources.
    ///
    /// # Errors
    ///
    /// Same as [`Self::query`].
    pub async fn query_source(
        &self,
        text: &str,
        k: usize,
        source: &str,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embed_with_retry(text).await?;
        let scoped = match self.backend.scan(Some(source)).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(source, error = %e, "chunk scan failed; returning no context");
                return Ok(Vec::new());
            }
        };
        if !scoped.is_empty() {
            return Ok(rank(&vector, scoped, k));
        }

        tracing::debug!(source, "no chunks for source; searching all documents");
        match self.backend.scan(None).await {
            Ok(chunks) => Ok(rank(&vector, chunks, k)),
            Err(e) => {
                tracing::warn!(error = %e, "chunk scan failed; returning no context");
                Ok(Vec::new())
            }
        }
    }

    /// Delete every stored chunk. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the delete fails.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        self.backend.clear().await
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the aggregate query fails.
    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.backend.stats().await
    }

    async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut attempt = 1;
        loop {
            match self.embed_once(text) {
                Ok(v) => return Ok(v),
                Err(e) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_after(attempt);
                    tracing::debug!(attempt, ?delay, error = %e, "embedding failed; retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn embed_once(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embedder = self.embedder.lock().unwrap_or_else(PoisonError::into_inner);
        embedder.embed(text)
    }
}

/// Score, verify and order chunks. Any integrity failure empties the result.
fn rank(query: &[f32], chunks: Vec<RegulatoryChunk>, k: usize) -> Vec<ScoredChunk> {
    let mut scored = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if let Err(reason) = verify(&chunk, query.len()) {
            tracing::warn!(chunk = %chunk.id, reason = %reason, "corrupt chunk in store; returning no context");
            return Vec::new();
        }
        let score = cosine_similarity(query, &chunk.embedding);
        scored.push(ScoredChunk { chunk, score });
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.chunk.text.chars().count().cmp(&b.chunk.text.chars().count()))
            .then_with(|| a.chunk.seq.cmp(&b.chunk.seq))
    });
    scored.truncate(k);
    scored
}

fn verify(chunk: &RegulatoryChunk, dimension: usize) -> Result<(), String> {
    if chunk.id != content_id(&chunk.text) {
        return Err("id does not match content hash".into());
    }
    if chunk.embedding.len() != dimension {
        return Err(format!(
            "embedding has {} dimensions, query has {dimension}",
            chunk.embedding.len()
        ));
    }
    Ok(())
}
