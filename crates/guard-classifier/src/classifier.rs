use std::future::Future;
use std::sync::Arc;

use guard_core::ComplianceBrief;
use guard_core::entities::CodeChunk;

use crate::error::{ClassifierError, ModelError};
use crate::model::ModelClient;
use crate::{parse, prompt};

/// Everything the classifier sees for one chunk.
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    pub brief: Arc<ComplianceBrief>,
    pub chunk: CodeChunk,
    /// Fence language for the snippet (`python`, `rust`, `text`, ...).
    pub language: String,
}

/// One reported violation, positioned relative to the chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// 1-based line inside the chunk, when the model gave one.
    pub line_offset: Option<u32>,
    pub violating_code: String,
    pub explanation: String,
    pub rule_violated: String,
}

/// Result of a call that produced a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Violations(Vec<Finding>),
    /// The reply could not be interpreted. Treated as "no violation".
    Unparsable { raw: String },
}

impl Classification {
    #[must_use]
    pub const fn is_unparsable(&self) -> bool {
        matches!(self, Self::Unparsable { .. })
    }
}

/// Judges a code chunk against a compliance brief.
pub trait Classifier: Send + Sync {
    /// # Errors
    ///
    /// [`ClassifierError::Transient`] when no reply was produced,
    /// [`ClassifierError::Rejected`] when the request was refused.
    fn classify(
        &self,
        request: &ChunkRequest,
    ) -> impl Future<Output = Result<Classification, ClassifierError>> + Send;
}

impl<C: Classifier> Classifier for Arc<C> {
    fn classify(
        &self,
        request: &ChunkRequest,
    ) -> impl Future<Output = Result<Classification, ClassifierError>> + Send {
        (**self).classify(request)
    }
}

impl<C: Classifier> Classifier for &C {
    fn classify(
        &self,
        request: &ChunkRequest,
    ) -> impl Future<Output = Result<Classification, ClassifierError>> + Send {
        (**self).classify(request)
    }
}

/// [`Classifier`] backed by a hosted language model.
#[derive(Debug, Clone)]
pub struct LlmClassifier<M> {
    model: M,
}

impl<M: ModelClient> LlmClassifier<M> {
    pub const fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: ModelClient> Classifier for LlmClassifier<M> {
    async fn classify(&self, request: &ChunkRequest) -> Result<Classification, ClassifierError> {
        let model_request = prompt::classify(request);
        match self.model.generate(&model_request).await {
            Ok(raw) => Ok(parse::parse_findings(&raw)),
            Err(ModelError::Unusable { raw }) => Ok(Classification::Unparsable { raw }),
            Err(e) => Err(e.into()),
        }
    }
}
