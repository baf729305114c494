use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ScanPass;

/// A requirement breach reported by the classifier, anchored to a file line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Violation {
    /// Path relative to the checkout root.
    pub file: String,
    /// 1-based line in `file`.
    pub line: u32,
    pub violating_code: String,
    pub explanation: String,
    pub rule_violated: String,
    pub pass: ScanPass,
}

impl Violation {
    /// Identity used when merging passes.
    #[must_use]
    pub fn dedup_key(&self) -> (&str, u32, &str) {
        (&self.file, self.line, &self.rule_violated)
    }
}
