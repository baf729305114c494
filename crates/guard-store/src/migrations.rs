//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::GuardDb;
use crate::error::StoreError;

/// Regulatory chunk table keyed by content hash.
const MIGRATION_001: &str = include_str!("../migrations/001_chunks.sql");
/// Audit ledger tables.
const MIGRATION_002: &str = include_str!("../migrations/002_audit_ledger.sql");

impl GuardDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| StoreError::Migration(format!("001_chunks: {e}")))?;
        self.conn
            .execute_batch(MIGRATION_002)
            .await
            .map_err(|e| StoreError::Migration(format!("002_audit_ledger: {e}")))?;
        Ok(())
    }
}
