//! Classifier and model client error types.

use std::time::Duration;

use thiserror::Error;

/// Errors from a raw model call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// HTTP transport error (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited")]
    RateLimited {
        /// `Retry-After` in seconds, when the server sent one.
        retry_after_secs: Option<u64>,
    },

    /// The API answered but the envelope held no usable text.
    #[error("unusable model reply: {raw}")]
    Unusable {
        /// Raw response body.
        raw: String,
    },

    /// The client is missing required settings.
    #[error("model client not configured: {0}")]
    NotConfigured(String),
}

impl ModelError {
    /// Whether the call produced no reply and may be attempted again.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unusable { .. } | Self::NotConfigured(_) => false,
        }
    }
}

/// Errors surfaced by [`crate::Classifier`] and [`crate::HintSource`].
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The request never produced a reply (connect failure, 429, 5xx).
    /// Safe to send again, no sooner than `retry_after` when present.
    #[error("transient classifier failure: {reason}")]
    Transient {
        reason: String,
        retry_after: Option<Duration>,
    },

    /// The deadline passed while waiting. The request may have been
    /// delivered, so it is never sent again.
    #[error("classifier timed out: {0}")]
    TimedOut(String),

    /// A reply arrived but could not be interpreted.
    #[error("unparsable classifier reply: {0}")]
    Parse(String),

    /// The request was refused (bad key, bad request). Not retried.
    #[error("classifier rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ClassifierError {
    /// A transient failure with no server-supplied wait.
    #[must_use]
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
            retry_after: None,
        }
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

impl From<ModelError> for ClassifierError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Http(e) if e.is_timeout() => Self::TimedOut(e.to_string()),
            ModelError::RateLimited { retry_after_secs } => Self::Transient {
                reason: "rate limited".into(),
                retry_after: retry_after_secs.map(Duration::from_secs),
            },
            e if e.is_transient() => Self::transient(e.to_string()),
            ModelError::Api { status, message } => Self::Rejected { status, message },
            ModelError::Unusable { raw } => Self::Parse(raw),
            ModelError::NotConfigured(message) => Self::Rejected { status: 0, message },
            other => Self::transient(other.to_string()),
        }
    }
}
