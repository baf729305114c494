//! Embedding engine selection.

use serde::{Deserialize, Serialize};

const fn default_hash_dimension() -> usize {
    384
}

/// Which embedder backs the chunk store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMode {
    /// Local ONNX model via fastembed (downloads on first use).
    #[default]
    Fastembed,
    /// Deterministic feature hashing. No model, no network.
    Hash,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub mode: EmbeddingMode,

    /// Vector width used in `hash` mode.
    #[serde(default = "default_hash_dimension")]
    pub hash_dimension: usize,

    /// Model cache directory for fastembed. Empty means the default cache.
    #[serde(default)]
    pub cache_dir: String,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::default(),
            hash_dimension: default_hash_dimension(),
            cache_dir: String::new(),
        }
    }
}
