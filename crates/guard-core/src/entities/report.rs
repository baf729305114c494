use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::brief::ComplianceBrief;
use crate::entities::{FileCandidate, Violation};
use crate::enums::{AuditMode, AuditOutcome, AuditState, ScanPass};

/// Counters collected by the chunk orchestrator for one pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ScanStats {
    pub files: usize,
    pub unreadable_files: usize,
    pub chunks: usize,
    /// Classifier calls made, retries included.
    pub invocations: usize,
    pub unparsable_replies: usize,
    /// Chunks that yielded nothing after retries were exhausted or rejected.
    pub degraded_chunks: usize,
}

impl ScanStats {
    pub fn absorb(&mut self, other: Self) {
        self.files += other.files;
        self.unreadable_files += other.unreadable_files;
        self.chunks += other.chunks;
        self.invocations += other.invocations;
        self.unparsable_replies += other.unparsable_replies;
        self.degraded_chunks += other.degraded_chunks;
    }
}

/// Files and raw (pre-merge) violations of one scan pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PassReport {
    pub pass: ScanPass,
    pub files: Vec<FileCandidate>,
    pub violations: Vec<Violation>,
    pub stats: ScanStats,
}

impl PassReport {
    #[must_use]
    pub const fn empty(pass: ScanPass) -> Self {
        Self {
            pass,
            files: Vec::new(),
            violations: Vec::new(),
            stats: ScanStats {
                files: 0,
                unreadable_files: 0,
                chunks: 0,
                invocations: 0,
                unparsable_replies: 0,
                degraded_chunks: 0,
            },
        }
    }
}

/// Aggregates over the merged violation list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditStats {
    pub pass1_files: usize,
    pub pass2_files: usize,
    /// Violations contributed by pass 1 after de-duplication.
    pub pass1_violations: usize,
    /// Violations contributed by pass 2 after de-duplication.
    pub pass2_violations: usize,
    pub total_violations: usize,
    pub affected_files: usize,
    pub distinct_rules: usize,
}

/// The product of one audit run, complete or partial.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditReport {
    /// Repository URL or local path the run was pointed at.
    pub repository: String,
    pub brief: ComplianceBrief,
    #[serde(default)]
    pub mode: AuditMode,
    pub pass1: PassReport,
    pub pass2: PassReport,
    /// De-duplicated union of both passes, pass-1 entries first.
    pub violations: Vec<Violation>,
    pub stats: AuditStats,
    pub summary: String,
    /// Every state the coordinator entered, in order.
    pub states: Vec<AuditState>,
    pub outcome: AuditOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl AuditReport {
    /// A blank report for a run that has just started.
    #[must_use]
    pub fn new(repository: impl Into<String>, brief: ComplianceBrief) -> Self {
        Self {
            repository: repository.into(),
            brief,
            mode: AuditMode::default(),
            pass1: PassReport::empty(ScanPass::First),
            pass2: PassReport::empty(ScanPass::Second),
            violations: Vec::new(),
            stats: AuditStats::default(),
            summary: String::new(),
            states: Vec::new(),
            outcome: AuditOutcome::Completed,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    #[must_use]
    pub fn last_state(&self) -> Option<AuditState> {
        self.states.last().copied()
    }
}

/// One row of the audit ledger, as listed by `grd history`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditRunSummary {
    pub id: String,
    pub repository: String,
    pub outcome: AuditOutcome,
    pub pass1_files: usize,
    pub pass2_files: usize,
    pub total_violations: usize,
    pub summary: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
