use std::path::PathBuf;

use thiserror::Error;

/// Failures acquiring a working checkout. All of them abort the audit run.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("repository path does not exist: {0}")]
    NotFound(PathBuf),
    #[error("repository path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("unrecognized repository source: {0}")]
    InvalidSource(String),
    #[error("clone of '{url}' failed: {reason}")]
    Clone { url: String, reason: String },
    #[error("checkout task failed: {0}")]
    Task(String),
}
