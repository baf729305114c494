use std::fmt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A working checkout owned by exactly one audit run.
///
/// Cloned checkouts live in a temporary directory that is deleted when the
/// session is dropped, whether the run finished, failed, or its future was
/// dropped mid-flight. Borrowed local directories are left untouched.
pub struct ScanSession {
    root: PathBuf,
    source: String,
    temp: Option<TempDir>,
}

impl ScanSession {
    /// Wrap a freshly populated temporary directory. `root` must lie inside it.
    #[must_use]
    pub fn ephemeral(temp: TempDir, root: PathBuf, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
            temp: Some(temp),
        }
    }

    /// Borrow an existing directory. Nothing is deleted on release.
    #[must_use]
    pub fn borrowed(root: PathBuf, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
            temp: None,
        }
    }

    /// Canonical checkout root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The URL or path the session was acquired from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn is_ephemeral(&self) -> bool {
        self.temp.is_some()
    }
}

impl fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("root", &self.root)
            .field("source", &self.source)
            .field("ephemeral", &self.is_ephemeral())
            .finish()
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            let path = temp.path().to_path_buf();
            match temp.close() {
                Ok(()) => tracing::debug!(path = %path.display(), "checkout released"),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove checkout");
                }
            }
        }
    }
}
