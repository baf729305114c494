//! # guard-embeddings
//!
//! Text embedding for Guardian's regulatory chunk store.
//!
//! Two implementations sit behind the [`Embedder`] capability:
//! - [`EmbeddingEngine`]: local ONNX inference through fastembed
//!   (`AllMiniLML6V2`, 384 dimensions, mean pooling, no API keys)
//! - [`HashEmbedder`]: deterministic feature hashing for tests and offline use
//!
//! ## Async usage
//!
//! Both embedders are synchronous. The store calls them while holding a
//! short-lived mutex; callers embedding large batches from async code should
//! move the engine into [`tokio::task::spawn_blocking`].

pub mod error;

mod engine;
mod hash;

pub use engine::EmbeddingEngine;
pub use error::EmbeddingError;
pub use hash::HashEmbedder;

/// A function from text to a fixed-width vector.
///
/// Implementations must be deterministic for identical input.
pub trait Embedder: Send {
    /// Width of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError`] if inference fails. Callers treat this as
    /// transient for the text in question.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }
}

/// Cosine similarity between two vectors. Zero when either has no magnitude
/// or the widths differ.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
