use std::future::Future;
use std::sync::Arc;

use guard_core::ComplianceBrief;
use guard_core::entities::Violation;

use crate::error::{ClassifierError, ModelError};
use crate::model::ModelClient;
use crate::{parse, prompt};

/// Input for a hint call. `prior` is empty for the first pass.
#[derive(Debug, Clone)]
pub struct HintRequest {
    pub brief: Arc<ComplianceBrief>,
    pub prior: Vec<Violation>,
}

/// Extra path globs and search keywords suggested by a model.
///
/// `extensions` (`.py`) only rank files that globs or keywords already
/// matched; they never select files themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hints {
    pub globs: Vec<String>,
    pub keywords: Vec<String>,
    pub extensions: Vec<String>,
}

impl Hints {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty() && self.keywords.is_empty() && self.extensions.is_empty()
    }
}

/// Suggests where to look for violations of a brief.
pub trait HintSource: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ClassifierError`] when the call failed. Callers treat any
    /// error as "no hints".
    fn suggest(
        &self,
        request: &HintRequest,
    ) -> impl Future<Output = Result<Hints, ClassifierError>> + Send;
}

impl<H: HintSource> HintSource for Arc<H> {
    fn suggest(
        &self,
        request: &HintRequest,
    ) -> impl Future<Output = Result<Hints, ClassifierError>> + Send {
        (**self).suggest(request)
    }
}

/// Deterministic source that never suggests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHints;

impl HintSource for NoHints {
    async fn suggest(&self, _request: &HintRequest) -> Result<Hints, ClassifierError> {
        Ok(Hints::default())
    }
}

/// [`HintSource`] backed by a hosted language model.
#[derive(Debug, Clone)]
pub struct LlmHintSource<M> {
    model: M,
}

impl<M: ModelClient> LlmHintSource<M> {
    pub const fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: ModelClient> HintSource for LlmHintSource<M> {
    async fn suggest(&self, request: &HintRequest) -> Result<Hints, ClassifierError> {
        let model_request = prompt::hints(request);
        let raw = match self.model.generate(&model_request).await {
            Ok(raw) => raw,
            Err(ModelError::Unusable { raw }) => return Err(ClassifierError::Parse(raw)),
            Err(e) => return Err(e.into()),
        };
        parse::parse_hints(&raw).ok_or(ClassifierError::Parse(raw))
    }
}
