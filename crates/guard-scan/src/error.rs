//! Scan error types for guard-scan.

/// Errors from building a file tree or a pattern matcher.
///
/// Per-file failures during a scan are logged and counted, never returned.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The checkout root is missing or not a directory.
    #[error("scan root is not a directory: {0}")]
    InvalidRoot(String),

    /// A glob or keyword could not be compiled.
    #[error("invalid pattern {pattern}: {reason}")]
    Pattern { pattern: String, reason: String },
}
