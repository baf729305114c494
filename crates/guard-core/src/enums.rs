//! State and classification enums for Guardian audits.
//!
//! All enums use `snake_case` serialization. [`AuditState`] carries the
//! coordinator's transition table; the coordinator consults
//! `can_transition_to()` before every move.

use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AuditState
// ---------------------------------------------------------------------------

/// Lifecycle of one audit run.
///
/// ```text
/// init → pattern_gen → pass1_scan → discovery → pass2_scan → merge → done
///   ╰──────────┴────────────┴───────────┴───────────┴──────────┴──→ failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditState {
    Init,
    PatternGen,
    #[serde(rename = "pass1_scan")]
    Pass1Scan,
    Discovery,
    #[serde(rename = "pass2_scan")]
    Pass2Scan,
    Merge,
    Done,
    Failed,
}

impl AuditState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Init => &[Self::PatternGen, Self::Failed],
            Self::PatternGen => &[Self::Pass1Scan, Self::Failed],
            Self::Pass1Scan => &[Self::Discovery, Self::Failed],
            Self::Discovery => &[Self::Pass2Scan, Self::Failed],
            Self::Pass2Scan => &[Self::Merge, Self::Failed],
            Self::Merge => &[Self::Done, Self::Failed],
            Self::Done | Self::Failed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::PatternGen => "pattern_gen",
            Self::Pass1Scan => "pass1_scan",
            Self::Discovery => "discovery",
            Self::Pass2Scan => "pass2_scan",
            Self::Merge => "merge",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AuditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ScanPass
// ---------------------------------------------------------------------------

/// Which scan pass produced a candidate or violation. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ScanPass {
    First,
    Second,
}

impl ScanPass {
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl From<ScanPass> for u8 {
    fn from(pass: ScanPass) -> Self {
        pass.number()
    }
}

impl TryFrom<u8> for ScanPass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            other => Err(format!("scan pass must be 1 or 2, got {other}")),
        }
    }
}

impl JsonSchema for ScanPass {
    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("ScanPass")
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        u8::json_schema(generator)
    }
}

impl fmt::Display for ScanPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// MatchReason
// ---------------------------------------------------------------------------

/// Why a file was selected for scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Matched a pattern derived from the brief.
    Pattern,
    /// Found during discovery from pass-1 findings.
    Discovered,
}

impl MatchReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Discovered => "discovered",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditOutcome
// ---------------------------------------------------------------------------

/// Terminal outcome recorded on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Completed,
    Failed,
}

impl AuditOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse the SQL storage representation.
    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditMode
// ---------------------------------------------------------------------------

/// How pass 1 picks its files.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// Brief-derived patterns, then discovery from pass-1 findings.
    #[default]
    Hybrid,
    /// Every eligible file in pass 1; discovery has nothing left to add.
    Full,
}

impl AuditMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for AuditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
