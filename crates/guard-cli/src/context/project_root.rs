use std::path::{Path, PathBuf};

/// Nearest ancestor of `start` (inclusive) holding a `.guardian` directory.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".guardian").is_dir())
        .map(Path::to_path_buf)
}
