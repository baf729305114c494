//! Chunk store and audit ledger configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".guardian/guardian.db".to_string()
}

const fn default_window_size() -> usize {
    1000
}

const fn default_window_overlap() -> usize {
    200
}

const fn default_query_k() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// libSQL database file. `:memory:` keeps everything in process.
    #[serde(default = "default_path")]
    pub path: String,

    /// Characters per ingestion window.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Characters shared by consecutive windows.
    #[serde(default = "default_window_overlap")]
    pub window_overlap: usize,

    /// Chunks retrieved per query.
    #[serde(default = "default_query_k")]
    pub query_k: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            window_size: default_window_size(),
            window_overlap: default_window_overlap(),
            query_k: default_query_k(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Resolve the database path against a project root.
    #[must_use]
    pub fn resolve_path(&self, project_root: &std::path::Path) -> PathBuf {
        let path = PathBuf::from(&self.path);
        if self.is_in_memory() || path.is_absolute() {
            path
        } else {
            project_root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_are_correct() {
        let config = StoreConfig::default();
        assert_eq!(config.path, ".guardian/guardian.db");
        assert_eq!(config.window_size, 1000);
        assert_eq!(config.window_overlap, 200);
        assert_eq!(config.query_k, 5);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn relative_path_resolves_against_root() {
        let config = StoreConfig::default();
        assert_eq!(
            config.resolve_path(Path::new("/work/repo")),
            PathBuf::from("/work/repo/.guardian/guardian.db")
        );
    }

    #[test]
    fn memory_path_is_left_alone() {
        let config = StoreConfig {
            path: ":memory:".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve_path(Path::new("/work")), PathBuf::from(":memory:"));
    }
}
