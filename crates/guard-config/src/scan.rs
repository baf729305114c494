//! Repository scanning configuration.

use serde::{Deserialize, Serialize};

/// Smallest allowed chunk, in lines.
pub const MIN_CHUNK_LINES: usize = 20;
/// Largest allowed chunk, in lines.
pub const MAX_CHUNK_LINES: usize = 40;

const fn default_chunk_lines() -> usize {
    30
}

const fn default_workers() -> usize {
    4
}

const fn default_max_file_bytes() -> u64 {
    1024 * 1024
}

const fn default_max_files_per_pass() -> usize {
    500
}

fn default_extensions() -> Vec<String> {
    [
        "py", "js", "java", "html", "css", "jsx", "tsx", "ts", "cpp", "c", "h", "go", "rb", "php",
        "swift", "kt", "rs",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_ignore_dirs() -> Vec<String> {
    [
        "node_modules",
        "venv",
        "env",
        ".git",
        "__pycache__",
        "build",
        "dist",
        ".idea",
        ".vscode",
        "target",
        "bin",
        "obj",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Lines per classifier chunk (20 to 40).
    #[serde(default = "default_chunk_lines")]
    pub chunk_lines: usize,

    /// Concurrent classifier calls within a pass.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Files larger than this are skipped.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Upper bound on files scanned in one pass.
    #[serde(default = "default_max_files_per_pass")]
    pub max_files_per_pass: usize,

    /// File extensions (without the dot) considered source code.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Directory names never descended into.
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_lines: default_chunk_lines(),
            workers: default_workers(),
            max_file_bytes: default_max_file_bytes(),
            max_files_per_pass: default_max_files_per_pass(),
            extensions: default_extensions(),
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

impl ScanConfig {
    /// `chunk_lines` clamped into the supported range.
    #[must_use]
    pub fn effective_chunk_lines(&self) -> usize {
        self.chunk_lines.clamp(MIN_CHUNK_LINES, MAX_CHUNK_LINES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ScanConfig::default();
        assert_eq!(config.chunk_lines, 30);
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_file_bytes, 1_048_576);
        assert_eq!(config.max_files_per_pass, 500);
        assert!(config.extensions.iter().any(|e| e == "py"));
        assert!(config.ignore_dirs.iter().any(|d| d == "node_modules"));
    }

    #[test]
    fn chunk_lines_are_clamped() {
        let mut config = ScanConfig {
            chunk_lines: 5,
            ..Default::default()
        };
        assert_eq!(config.effective_chunk_lines(), 20);
        config.chunk_lines = 400;
        assert_eq!(config.effective_chunk_lines(), 40);
    }
}
