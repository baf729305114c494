//! The compliance brief: an ordered list of plain-language requirements.
//!
//! A brief is immutable for the duration of an audit run. Construction trims
//! every statement and drops blank ones, so an audit never sends an empty
//! requirement to the classifier.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ordered, immutable list of requirement statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ComplianceBrief {
    statements: Vec<String>,
}

impl ComplianceBrief {
    /// Build a brief from statements, trimming each and dropping blanks.
    pub fn new<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let statements = statements
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { statements }
    }

    /// Parse a brief from free text with one requirement per line.
    ///
    /// Bullet markers (`-`, `*`, `•`, `+`) and ordinal prefixes (`1.`, `2)`)
    /// are stripped. Markdown headings and lines ending in `:` are treated as
    /// section titles and skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#') && !line.ends_with(':'))
                .map(strip_list_marker),
        )
    }

    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Render as a numbered list, one statement per line.
    #[must_use]
    pub fn render(&self) -> String {
        self.statements
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {s}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim_start_matches(['-', '*', '•', '+']).trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim_start();
        }
    }
    line
}
