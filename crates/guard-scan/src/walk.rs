//! Source-file discovery under a checkout root.
//!
//! Uses the `ignore` crate for gitignore-aware walking. Hidden files are
//! visited (`.github/workflows/*.js` is code too) but configured directory
//! names such as `.git` and `node_modules` are never descended into. A
//! `.guardianignore` file works like `.gitignore`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use guard_config::ScanConfig;
use ignore::WalkBuilder;

use crate::error::ScanError;

/// Per-repository ignore file.
pub const IGNORE_FILENAME: &str = ".guardianignore";

/// Build a walker over `root` honouring `.gitignore`, `.guardianignore` and
/// the configured directory exclusions.
#[must_use]
pub fn build_walker(root: &Path, config: &ScanConfig) -> ignore::Walk {
    let ignored: HashSet<String> = config.ignore_dirs.iter().cloned().collect();
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .require_git(false)
        .add_custom_ignore_filename(IGNORE_FILENAME);
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        !(is_dir && ignored.contains(entry.file_name().to_string_lossy().as_ref()))
    });
    builder.build()
}

/// The eligible source files of one checkout, as sorted relative paths.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
    files: Vec<String>,
}

impl SourceTree {
    /// Walk `root` and keep files with a configured extension that are no
    /// larger than `max_file_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidRoot`] when `root` is not a directory.
    pub fn collect(root: &Path, config: &ScanConfig) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::InvalidRoot(root.display().to_string()));
        }
        let extensions: HashSet<String> = config
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();

        let mut files = Vec::new();
        for result in build_walker(root, config) {
            let entry = match result {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "walker error");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            let eligible = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.contains(&e.to_lowercase()));
            if !eligible {
                continue;
            }
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if size > config.max_file_bytes {
                tracing::debug!(path = %path.display(), size, "skipping large file");
                continue;
            }
            if let Some(rel) = relative_path(root, path) {
                files.push(rel);
            }
        }
        files.sort();
        files.dedup();
        tracing::debug!(root = %root.display(), files = files.len(), "source tree collected");
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted, `/`-separated paths relative to the root.
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }

    #[must_use]
    pub fn contains(&self, rel: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(rel)).is_ok()
    }

    #[must_use]
    pub fn absolute(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }
}

/// `/`-separated path of `path` relative to `root`.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
