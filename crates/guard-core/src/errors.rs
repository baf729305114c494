//! Errors shared across Guardian crates.
//!
//! Each crate keeps its own error enum; `guard-cli` folds them into `anyhow`.

use thiserror::Error;

use crate::enums::AuditState;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The audit lifecycle only moves forward along its fixed edges.
    #[error("audit cannot move from {from} to {to}")]
    InvalidTransition { from: AuditState, to: AuditState },
}
