use std::future::Future;
use std::sync::Arc;

use crate::error::ModelError;

/// One text-generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRequest {
    /// Optional system instruction.
    pub system: Option<String>,
    /// User prompt.
    pub prompt: String,
    /// Ask the model for a JSON reply.
    pub json: bool,
}

impl ModelRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            json: false,
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub const fn expect_json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// A hosted language model that turns a prompt into text.
pub trait ModelClient: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ModelError`] when no usable reply was produced.
    fn generate(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<String, ModelError>> + Send;
}

impl<M: ModelClient> ModelClient for Arc<M> {
    fn generate(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<String, ModelError>> + Send {
        (**self).generate(request)
    }
}

impl<M: ModelClient> ModelClient for &M {
    fn generate(
        &self,
        request: &ModelRequest,
    ) -> impl Future<Output = Result<String, ModelError>> + Send {
        (**self).generate(request)
    }
}
