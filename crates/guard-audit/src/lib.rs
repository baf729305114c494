//! # guard-audit
//!
//! The two-pass hybrid audit and the pieces around it:
//!
//! - [`CandidateSelector`] turns a brief (and later, findings) into patterns
//! - [`AuditCoordinator`] drives checkout → pass 1 → discovery → pass 2 →
//!   merge, recording the visited states
//! - [`merge`] and [`summary`] reconcile the passes
//! - [`BriefBuilder`] derives a brief from ingested regulatory text
//! - [`ReportSink`] receives finished reports (the audit ledger in `grd`)

pub mod brief;
pub mod coordinator;
pub mod error;
pub mod merge;
pub mod selector;
pub mod sink;

pub use brief::{BriefBuilder, DerivedBrief};
pub use coordinator::AuditCoordinator;
pub use error::{AuditError, AuditFailure, BriefError};
pub use merge::{merge, summary};
pub use selector::{CandidateSelector, statement_keywords};
pub use sink::{NullSink, ReportSink};
