use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{MatchReason, ScanPass};

/// A hint describing which files deserve a look.
///
/// Patterns are ordered so selector output collected into a `BTreeSet` is
/// deterministic.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CandidatePattern {
    /// Path glob relative to the checkout root (`**/auth*.py`).
    Glob(String),
    /// Case-insensitive literal matched against the path or the file contents.
    Keyword(String),
    /// Preferred extension (`.py`). Selects nothing alone; when a pass has
    /// more matches than it may scan, files with a preferred extension are
    /// kept first.
    Extension(String),
    /// Every eligible source file.
    Everything,
}

impl CandidatePattern {
    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    /// Keywords are stored lowercase.
    #[must_use]
    pub fn keyword(word: impl AsRef<str>) -> Self {
        Self::Keyword(word.as_ref().to_lowercase())
    }

    /// Lowercase with a leading dot: `PY` and `.py` are the same extension.
    #[must_use]
    pub fn extension(ext: impl AsRef<str>) -> Self {
        let ext = ext.as_ref().trim().to_lowercase();
        if ext.starts_with('.') {
            Self::Extension(ext)
        } else {
            Self::Extension(format!(".{ext}"))
        }
    }

    /// Whether this pattern can put a file into a pass on its own.
    #[must_use]
    pub const fn selects(&self) -> bool {
        !matches!(self, Self::Extension(_))
    }
}

impl fmt::Display for CandidatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Glob(g) => write!(f, "glob:{g}"),
            Self::Keyword(k) => write!(f, "keyword:{k}"),
            Self::Extension(e) => write!(f, "extension:{e}"),
            Self::Everything => f.write_str("everything"),
        }
    }
}

/// A file selected for one scan pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FileCandidate {
    /// Path relative to the checkout root, `/`-separated.
    pub path: String,
    pub match_reason: MatchReason,
    pub pass: ScanPass,
}
