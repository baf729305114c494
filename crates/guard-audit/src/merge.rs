//! Merging pass results and the run summary.

use std::collections::{BTreeSet, HashSet};

use guard_core::entities::{AuditStats, PassReport, Violation};
use guard_core::enums::ScanPass;

/// Concatenate both passes and drop later duplicates of
/// `(file, line, rule_violated)`.
#[must_use]
pub fn merge(pass1: &PassReport, pass2: &PassReport) -> (Vec<Violation>, AuditStats) {
    let mut seen = HashSet::new();
    let merged: Vec<Violation> = pass1
        .violations
        .iter()
        .chain(&pass2.violations)
        .filter(|v| seen.insert(v.dedup_key()))
        .cloned()
        .collect();

    let pass1_violations = merged.iter().filter(|v| v.pass == ScanPass::First).count();
    let stats = AuditStats {
        pass1_files: pass1.files.len(),
        pass2_files: pass2.files.len(),
        pass1_violations,
        pass2_violations: merged.len() - pass1_violations,
        total_violations: merged.len(),
        affected_files: merged.iter().map(|v| v.file.as_str()).collect::<BTreeSet<_>>().len(),
        distinct_rules: merged
            .iter()
            .map(|v| v.rule_violated.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
    };
    (merged, stats)
}

/// The three-line run summary.
#[must_use]
pub fn summary(stats: &AuditStats) -> String {
    format!(
        "Pass 1: found {} files → {} violations.\n\
         Pass 2: found {} new files → {} additional violations.\n\
         Total: {}.",
        stats.pass1_files,
        stats.pass1_violations,
        stats.pass2_files,
        stats.pass2_violations,
        stats.pass1_violations + stats.pass2_violations,
    )
}
