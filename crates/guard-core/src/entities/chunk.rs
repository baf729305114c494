use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A window of regulatory text, identified by the SHA-256 of its content.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RegulatoryChunk {
    /// Lowercase hex SHA-256 of `text`.
    pub id: String,
    pub text: String,
    pub source_document: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    pub inserted_at: DateTime<Utc>,
    /// Store-assigned insertion ordinal, used only to break ties.
    pub seq: i64,
}

/// A retrieval hit with its cosine similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScoredChunk {
    pub chunk: RegulatoryChunk,
    pub score: f32,
}

/// A contiguous line range of one source file. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CodeChunk {
    /// Path relative to the checkout root, `/`-separated.
    pub file_path: String,
    /// 1-based, inclusive.
    pub start_line: u32,
    /// 1-based, inclusive.
    pub end_line: u32,
    pub text: String,
}

impl CodeChunk {
    #[must_use]
    pub const fn line_count(&self) -> u32 {
        self.end_line - self.start_line + 1
    }

    /// The chunk text with each line prefixed by its in-chunk offset (`1: ...`).
    #[must_use]
    pub fn numbered_text(&self) -> String {
        self.text
            .lines()
            .enumerate()
            .map(|(i, line)| format!("{}: {line}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Map a 1-based in-chunk offset to a file line, clamping into the chunk.
    #[must_use]
    pub fn absolute_line(&self, offset: Option<u32>) -> u32 {
        let offset = offset.unwrap_or(1).clamp(1, self.line_count());
        self.start_line + offset - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn chunk() -> CodeChunk {
        CodeChunk {
            file_path: "src/auth.py".into(),
            start_line: 31,
            end_line: 60,
            text: "a\nb\nc".into(),
        }
    }

    #[rstest]
    #[case(Some(1), 31)]
    #[case(Some(10), 40)]
    #[case(Some(30), 60)]
    #[case(Some(0), 31)]
    #[case(Some(99), 60)]
    #[case(None, 31)]
    fn absolute_line_clamps_into_chunk(#[case] offset: Option<u32>, #[case] expected: u32) {
        assert_eq!(chunk().absolute_line(offset), expected);
    }

    #[test]
    fn numbered_text_prefixes_offsets() {
        assert_eq!(chunk().numbered_text(), "1: a\n2: b\n3: c");
    }
}
