//! Destinations for finished audit reports.

use std::future::Future;

use guard_core::entities::AuditReport;
use guard_store::{AuditLedger, StoreError};

/// Receives each completed report during the merge step.
pub trait ReportSink: Send + Sync {
    /// # Errors
    ///
    /// A storage failure fails the run.
    fn record(&self, report: &AuditReport) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Discards reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    async fn record(&self, _report: &AuditReport) -> Result<(), StoreError> {
        Ok(())
    }
}

impl ReportSink for AuditLedger {
    async fn record(&self, report: &AuditReport) -> Result<(), StoreError> {
        let id = Self::record(self, report).await?;
        tracing::info!(run = %id, "audit recorded");
        Ok(())
    }
}
