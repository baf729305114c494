//! # guard-scan
//!
//! Turns a checkout and a set of candidate patterns into violations.
//!
//! - [`SourceTree`] lists the eligible source files under a root
//! - [`resolve`] matches [`CandidatePattern`](guard_core::entities::CandidatePattern)s
//!   against that list
//! - [`chunk_file`] splits a file into line ranges
//! - [`ScanOrchestrator`] classifies every chunk on a bounded worker pool

pub mod chunker;
pub mod error;
pub mod orchestrator;
pub mod resolve;
pub mod walk;

pub use chunker::{chunk_file, language_for};
pub use error::ScanError;
pub use orchestrator::{PassScan, ScanOrchestrator};
pub use resolve::{Resolution, contains_keyword, resolve};
pub use walk::{SourceTree, build_walker};
