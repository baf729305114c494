//! Deriving a compliance brief from ingested regulatory text.

use guard_classifier::{ModelClient, prompt};
use guard_core::ComplianceBrief;
use guard_embeddings::Embedder;
use guard_store::{ChunkBackend, ChunkStore, StoreError};

use crate::error::BriefError;

/// A derived brief and how much context backed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedBrief {
    pub brief: ComplianceBrief,
    pub context_chunks: usize,
}

/// Answers a question from the chunk store and turns the answer into a brief.
pub struct BriefBuilder<'a, B, E, M> {
    store: &'a ChunkStore<B, E>,
    model: M,
}

impl<'a, B: ChunkBackend, E: Embedder, M: ModelClient> BriefBuilder<'a, B, E, M> {
    pub const fn new(store: &'a ChunkStore<B, E>, model: M) -> Self {
        Self { store, model }
    }

    /// Retrieve `k` chunks for `question` (from `source` when given) and ask
    /// the model for requirements grounded in them.
    ///
    /// # Errors
    ///
    /// [`BriefError::NoContext`] when retrieval finds nothing, otherwise the
    /// embedding or model failure.
    pub async fn derive(
        &self,
        question: &str,
        k: usize,
        source: Option<&str>,
    ) -> Result<DerivedBrief, BriefError> {
        let hits = match source {
            Some(source) => self.store.query_source(question, k, source).await,
            None => self.store.query(question, k).await,
        };
        let hits = match hits {
            Ok(hits) => hits,
            Err(StoreError::Embedding(e)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed; treating as no context");
                Vec::new()
            }
        };
        if hits.is_empty() {
            return Err(BriefError::NoContext);
        }

        let context: Vec<String> = hits.into_iter().map(|h| h.chunk.text).collect();
        tracing::debug!(chunks = context.len(), "deriving brief");
        let answer = self.model.generate(&prompt::brief(question, &context)).await?;
        let brief = ComplianceBrief::parse(&answer);
        if brief.is_empty() {
            return Err(BriefError::EmptyAnswer);
        }
        Ok(DerivedBrief {
            brief,
            context_chunks: context.len(),
        })
    }
}
