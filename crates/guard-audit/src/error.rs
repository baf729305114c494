//! Audit error types.

use guard_checkout::CheckoutError;
use guard_core::entities::AuditReport;
use guard_core::errors::CoreError;
use guard_embeddings::EmbeddingError;
use guard_scan::ScanError;
use guard_store::StoreError;

/// Unrecoverable failures of an audit run.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The repository could not be checked out.
    #[error("checkout failed: {0}")]
    Checkout(#[from] CheckoutError),

    /// The checkout could not be walked.
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    /// The finished report could not be stored.
    #[error("storage failed: {0}")]
    Storage(#[from] StoreError),

    /// The coordinator attempted an illegal state change.
    #[error(transparent)]
    Transition(#[from] CoreError),
}

/// A failed run together with everything collected before the failure.
#[derive(Debug, thiserror::Error)]
#[error("audit of {} failed: {error}", partial.repository)]
pub struct AuditFailure {
    #[source]
    pub error: AuditError,
    pub partial: Box<AuditReport>,
}

/// Errors from deriving a compliance brief.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// Retrieval found nothing to ground the answer in.
    #[error("no regulatory context found; ingest a document first")]
    NoContext,

    /// The question could not be embedded.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("model call failed: {0}")]
    Model(#[from] guard_classifier::ModelError),

    /// The model answered with no usable requirement.
    #[error("model reply contained no requirements")]
    EmptyAnswer,
}
