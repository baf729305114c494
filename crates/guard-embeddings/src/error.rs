/// Why a text could not be turned into a vector.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The ONNX model could not be downloaded or loaded.
    #[error("embedding model unavailable: {0}")]
    ModelLoad(String),

    /// Inference ran and failed for this input.
    #[error("embedding inference failed: {0}")]
    Inference(String),

    #[error("embedder returned no vector")]
    NoVector,

    #[error("embedder has zero width")]
    ZeroDimension,
}
