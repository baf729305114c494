//! # guard-store
//!
//! libSQL persistence for Guardian.
//!
//! - [`ChunkStore`]: content-addressed, deduplicated storage of embedded
//!   regulatory text windows, with cosine retrieval
//! - [`AuditLedger`]: history of audit runs and their merged violations
//!
//! Both sit on one [`GuardDb`] handle. Storage is always passed explicitly;
//! there is no process-wide connection.

pub mod backend;
pub mod error;
pub mod helpers;
pub mod ledger;
mod migrations;
pub mod splitter;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use libsql::Builder;

pub use backend::{ChunkBackend, LibSqlChunkBackend, NewChunk, StoreStats};
pub use error::StoreError;
pub use ledger::AuditLedger;
pub use splitter::WindowConfig;
pub use store::{ChunkStore, IngestOutcome};

/// Shared database handle.
///
/// Cloning is cheap and every clone talks to the same database, which matters
/// for `:memory:` databases where a second `connect()` would open a fresh,
/// empty one.
#[derive(Clone)]
pub struct GuardDb {
    #[allow(dead_code)]
    db: Arc<libsql::Database>,
    conn: libsql::Connection,
}

impl GuardDb {
    /// Open a local database at the given path, creating parent directories.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::InvalidState(format!(
                            "cannot create {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let guard_db = Self {
            db: Arc::new(db),
            conn,
        };
        guard_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(guard_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"aud-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, StoreError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}
