use serde::{Deserialize, Serialize};

/// Settings that apply to every command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Rows listed by `grd history` when `--limit` is absent.
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}
