//! CLI response types returned as JSON by `grd` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::brief::ComplianceBrief;
use crate::entities::{AuditRunSummary, ScoredChunk};

/// Response from `grd ingest`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IngestResponse {
    pub source: String,
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_chunks: u64,
}

/// A single hit from `grd query`. Embeddings are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub source_document: String,
    pub score: f32,
    pub text: String,
}

impl From<ScoredChunk> for QueryHit {
    fn from(hit: ScoredChunk) -> Self {
        Self {
            id: hit.chunk.id,
            source_document: hit.chunk.source_document,
            score: hit.score,
            text: hit.chunk.text,
        }
    }
}

/// Response from `grd query`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QueryResponse {
    pub query: String,
    pub results: Vec<QueryHit>,
    pub total_results: usize,
}

/// Response from `grd store stats`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StoreStatsResponse {
    pub path: String,
    pub chunks: u64,
    pub sources: u64,
    pub approx_bytes: u64,
}

/// Response from `grd store clear`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ClearResponse {
    pub removed: u64,
}

/// Response from `grd brief`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BriefResponse {
    pub question: String,
    pub context_chunks: usize,
    pub brief: ComplianceBrief,
}

/// Response from `grd history`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HistoryResponse {
    pub runs: Vec<AuditRunSummary>,
}
