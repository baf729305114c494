//! # guard-core
//!
//! Core types and error types for Guardian.
//!
//! This crate provides the foundational types shared across all Guardian crates:
//! - The compliance brief and the entities flowing through an audit
//!   (candidates, code chunks, violations, per-pass reports)
//! - The stored regulatory chunk record
//! - The audit state machine with its transition guards
//! - Cross-cutting error types and the retry schedule
//! - CLI response types

pub mod brief;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod responses;
pub mod retry;

pub use brief::ComplianceBrief;
