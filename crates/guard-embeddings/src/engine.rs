use std::path::PathBuf;

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

use crate::{Embedder, EmbeddingError};

/// Local embedding engine backed by fastembed (ONNX runtime).
///
/// Wraps the `AllMiniLML6V2` model to produce 384-dimensional float vectors.
/// Model files are downloaded on first use and cached at
/// `~/.guardian/cache/fastembed/` unless another directory is given.
///
/// # Thread safety
///
/// [`TextEmbedding::embed`] requires `&mut self`. The chunk store keeps the
/// engine behind a `Mutex` and holds the lock only for the embed call.
pub struct EmbeddingEngine {
    model: TextEmbedding,
}

impl EmbeddingEngine {
    /// Create a new embedding engine with the `AllMiniLML6V2` model.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::ModelLoad`] if model download or ONNX initialization fails.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, EmbeddingError> {
        let cache_dir = cache_dir.unwrap_or_else(Self::default_cache_dir);
        tracing::debug!(cache_dir = %cache_dir.display(), "initializing fastembed model");

        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?;

        Ok(Self { model })
    }

    fn default_cache_dir() -> PathBuf {
        dirs::home_dir().map_or_else(
            || PathBuf::from(".fastembed_cache"),
            |h| h.join(".guardian").join("cache").join("fastembed"),
        )
    }

    /// Embed a batch of texts. Returns one 384-dim vector per input.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::Inference`] if the ONNX inference fails.
    pub fn embed_batch(&mut self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))
    }

    /// Embedding vector dimensionality (always 384 for `AllMiniLML6V2`).
    pub const DIMENSION: usize = 384;
}

impl Embedder for EmbeddingEngine {
    fn dimension(&self) -> usize {
        Self::DIMENSION
    }

    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut results = self.embed_batch(vec![text.to_string()])?;
        results.pop().ok_or(EmbeddingError::NoVector)
    }
}
