//! Entity structs for Guardian domain objects.
//!
//! Stored records ([`RegulatoryChunk`], [`AuditRunSummary`]) map to tables in
//! the libSQL database. The rest are the values flowing through an audit run.
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod candidate;
mod chunk;
mod report;
mod violation;

pub use candidate::{CandidatePattern, FileCandidate};
pub use chunk::{CodeChunk, RegulatoryChunk, ScoredChunk};
pub use report::{AuditReport, AuditRunSummary, AuditStats, PassReport, ScanStats};
pub use violation::Violation;
