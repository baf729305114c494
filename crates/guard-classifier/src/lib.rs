//! # guard-classifier
//!
//! Model-backed judgement for Guardian audits.
//!
//! - [`ModelClient`] is a hosted text model; [`GeminiClient`] is the
//!   production implementation over the Gemini REST API.
//! - [`Classifier`] judges one [`ChunkRequest`] and returns a
//!   [`Classification`]; malformed replies become
//!   [`Classification::Unparsable`] instead of errors.
//! - [`HintSource`] suggests extra globs and keywords for candidate selection.
//! - [`RetryPolicy`] adds a per-call deadline and bounded retries for calls
//!   that produced no reply.

pub mod classifier;
pub mod error;
pub mod gemini;
pub mod hints;
mod http;
pub mod model;
pub mod parse;
pub mod prompt;
pub mod retry;

pub use classifier::{ChunkRequest, Classification, Classifier, Finding, LlmClassifier};
pub use error::{ClassifierError, ModelError};
pub use gemini::GeminiClient;
pub use hints::{HintRequest, HintSource, Hints, LlmHintSource, NoHints};
pub use model::{ModelClient, ModelRequest};
pub use retry::{Attempted, ChunkOutcome, RetryPolicy};
