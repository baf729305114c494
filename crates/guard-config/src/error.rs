/// Failures while assembling a [`GuardConfig`](crate::GuardConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A file or environment layer could not be read into the schema.
    #[error("cannot load guardian configuration: {0}")]
    Load(#[from] figment::Error),

    /// The layers merged but a value is unusable.
    #[error("`{key}` {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}
