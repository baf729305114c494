//! Errors raised by the chunk store and the audit ledger.

use guard_embeddings::EmbeddingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A statement ran but its result could not be used.
    #[error("store query: {0}")]
    Query(String),

    #[error("schema setup: {0}")]
    Migration(String),

    /// A statement that always yields a row yielded none.
    #[error("store returned no row")]
    NoResult,

    /// A persisted chunk no longer matches its recorded dimension or encoding.
    #[error("chunk {id} is unreadable: {reason}")]
    Corrupt { id: String, reason: String },

    /// Caller asked for something the store cannot do with its settings.
    #[error("store misuse: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("libsql: {0}")]
    LibSql(#[from] libsql::Error),
}
