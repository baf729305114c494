//! Audit ledger repository.
//!
//! Append-only record of audit runs. Each run stores its summary counts and
//! the merged violation list in order.

use guard_core::entities::{AuditReport, AuditRunSummary, Violation};
use guard_core::enums::{AuditOutcome, ScanPass};
use libsql::Value;

use crate::GuardDb;
use crate::error::StoreError;
use crate::helpers::{parse_datetime, parse_optional_datetime, to_usize};

#[derive(Clone)]
pub struct AuditLedger {
    db: GuardDb,
}

fn int(value: usize) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

impl AuditLedger {
    #[must_use]
    pub const fn new(db: GuardDb) -> Self {
        Self { db }
    }

    /// Persist a report. Returns the new run id (`aud-xxxxxxxx`).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if any insert fails; the run is then not stored.
    pub async fn record(&self, report: &AuditReport) -> Result<String, StoreError> {
        let id = self.db.generate_id("aud").await?;
        let brief = serde_json::to_string(&report.brief)
            .map_err(|e| StoreError::Query(format!("brief serialization: {e}")))?;
        let states = serde_json::to_string(&report.states)
            .map_err(|e| StoreError::Query(format!("state trace serialization: {e}")))?;

        let tx = self.db.conn().transaction().await?;
        tx.execute(
            "INSERT INTO audit_runs (id, repository, outcome, brief, states, pass1_files, pass2_files,
                                     pass1_violations, pass2_violations, total_violations, summary,
                                     started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            libsql::params_from_iter(vec![
                Value::Text(id.clone()),
                Value::Text(report.repository.clone()),
                Value::Text(report.outcome.as_str().to_string()),
                Value::Text(brief),
                Value::Text(states),
                int(report.stats.pass1_files),
                int(report.stats.pass2_files),
                int(report.stats.pass1_violations),
                int(report.stats.pass2_violations),
                int(report.stats.total_violations),
                Value::Text(report.summary.clone()),
                Value::Text(report.started_at.to_rfc3339()),
                report
                    .finished_at
                    .map_or(Value::Null, |t| Value::Text(t.to_rfc3339())),
            ]),
        )
        .await?;

        for (ordinal, v) in report.violations.iter().enumerate() {
            tx.execute(
                "INSERT INTO audit_violations (run_id, ordinal, file, line, violating_code,
                                               explanation, rule_violated, pass)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params_from_iter(vec![
                    Value::Text(id.clone()),
                    int(ordinal),
                    Value::Text(v.file.clone()),
                    Value::Integer(i64::from(v.line)),
                    Value::Text(v.violating_code.clone()),
                    Value::Text(v.explanation.clone()),
                    Value::Text(v.rule_violated.clone()),
                    Value::Integer(i64::from(v.pass.number())),
                ]),
            )
            .await?;
        }
        tx.commit().await?;

        tracing::info!(run = %id, violations = report.violations.len(), "audit run recorded");
        Ok(id)
    }

    /// Most recent runs first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is malformed.
    pub async fn recent(&self, limit: u32) -> Result<Vec<AuditRunSummary>, StoreError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT id, repository, outcome, pass1_files, pass2_files, total_violations,
                        summary, started_at, finished_at
                 FROM audit_runs ORDER BY started_at DESC, rowid DESC LIMIT ?1",
                [i64::from(limit)],
            )
            .await?;

        let mut runs = Vec::new();
        while let Some(row) = rows.next().await? {
            let outcome = row.get::<String>(2)?;
            runs.push(AuditRunSummary {
                id: row.get::<String>(0)?,
                repository: row.get::<String>(1)?,
                outcome: AuditOutcome::from_db(&outcome)
                    .ok_or_else(|| StoreError::Query(format!("unknown outcome '{outcome}'")))?,
                pass1_files: to_usize(row.get::<i64>(3)?),
                pass2_files: to_usize(row.get::<i64>(4)?),
                total_violations: to_usize(row.get::<i64>(5)?),
                summary: row.get::<String>(6)?,
                started_at: parse_datetime(&row.get::<String>(7)?)?,
                finished_at: parse_optional_datetime(row.get::<Option<String>>(8)?.as_deref())?,
            });
        }
        Ok(runs)
    }

    /// Merged violations of one run, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row is malformed.
    pub async fn violations(&self, run_id: &str) -> Result<Vec<Violation>, StoreError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT file, line, violating_code, explanation, rule_violated, pass
                 FROM audit_violations WHERE run_id = ?1 ORDER BY ordinal",
                [run_id],
            )
            .await?;

        let mut violations = Vec::new();
        while let Some(row) = rows.next().await? {
            let pass = u8::try_from(row.get::<i64>(5)?)
                .ok()
                .and_then(|p| ScanPass::try_from(p).ok())
                .ok_or_else(|| StoreError::Query("invalid pass number".into()))?;
            violations.push(Violation {
                file: row.get::<String>(0)?,
                line: u32::try_from(row.get::<i64>(1)?).unwrap_or(0),
                violating_code: row.get::<String>(2)?,
                explanation: row.get::<String>(3)?,
                rule_violated: row.get::<String>(4)?,
                pass,
            });
        }
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use guard_core::ComplianceBrief;
    use guard_core::enums::AuditState;
    use pretty_assertions::assert_eq;

    fn report(repository: &str, violations: Vec<Violation>) -> AuditReport {
        let mut report = AuditReport::new(repository, ComplianceBrief::new(["Use TLS"]));
        report.stats.total_violations = violations.len();
        report.violations = violations;
        report.states = vec![AuditState::Init, AuditState::Done];
        report.summary = "Pass 1: found 0 files → 0 violations.".into();
        report.finished_at = Some(Utc::now());
        report
    }

    fn violation(file: &str, line: u32, pass: ScanPass) -> Violation {
        Violation {
            file: file.into(),
            line,
            violating_code: "http://example.com".into(),
            explanation: "plain HTTP".into(),
            rule_violated: "Use TLS".into(),
            pass,
        }
    }

    #[tokio::test]
    async fn record_and_read_back() {
        let ledger = AuditLedger::new(GuardDb::open_local(":memory:").await.expect("database should open"));
        let violations = vec![
            violation("b.py", 3, ScanPass::First),
            violation("a.py", 1, ScanPass::Second),
        ];
        let id = ledger.record(&report("repo", violations.clone())).await.expect("record should succeed");

        assert_eq!(ledger.violations(&id).await.expect("violations should succeed"), violations);
        let runs = ledger.recent(10).await.expect("recent should succeed");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, id);
        assert_eq!(runs[0].total_violations, 2);
        assert_eq!(runs[0].outcome, AuditOutcome::Completed);
    }

    #[tokio::test]
    async fn recent_lists_newest_first_and_respects_limit() {
        let ledger = AuditLedger::new(GuardDb::open_local(":memory:").await.expect("database should open"));
        let mut older = report("old", Vec::new());
        older.started_at = Utc::now() - Duration::hours(1);
        ledger.record(&older).await.expect("record should succeed");
        ledger.record(&report("new", Vec::new())).await.expect("record should succeed");

        let runs = ledger.recent(1).await.expect("recent should succeed");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].repository, "new");
    }
}
