//! Chunked classification of one pass worth of files.
//!
//! Files are read and chunked up front, then every chunk goes through the
//! classifier on a bounded pool (`buffer_unordered(workers)`). Results are
//! re-sorted by (file, chunk) so output order never depends on completion
//! order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use guard_classifier::{
    Attempted, ChunkOutcome, ChunkRequest, Classification, Classifier, RetryPolicy,
};
use guard_config::ScanConfig;
use guard_core::ComplianceBrief;
use guard_core::entities::{CodeChunk, FileCandidate, ScanStats, Violation};
use guard_core::enums::ScanPass;

use crate::chunker::{chunk_file, language_for};

/// Violations and counters from one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassScan {
    pub violations: Vec<Violation>,
    pub stats: ScanStats,
}

/// One unit of classifier work.
struct Unit {
    file: usize,
    chunk: usize,
    request: ChunkRequest,
}

/// Runs the classifier over files under one checkout root.
#[derive(Debug)]
pub struct ScanOrchestrator<C> {
    classifier: C,
    policy: RetryPolicy,
    root: PathBuf,
    chunk_lines: usize,
    workers: usize,
}

impl<C: Classifier> ScanOrchestrator<C> {
    /// `root` should be the canonical checkout root; candidate paths are
    /// resolved against it.
    pub fn new(classifier: C, root: impl Into<PathBuf>, config: &ScanConfig, policy: RetryPolicy) -> Self {
        Self {
            classifier,
            policy,
            root: root.into(),
            chunk_lines: config.effective_chunk_lines(),
            workers: config.workers.max(1),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify every chunk of `files` against `brief`.
    ///
    /// Unreadable files, unparsable replies, and chunks whose retries ran out
    /// are counted in [`ScanStats`] and contribute no violations.
    pub async fn scan(
        &self,
        files: &[FileCandidate],
        brief: &Arc<ComplianceBrief>,
        pass: ScanPass,
    ) -> PassScan {
        let mut stats = ScanStats {
            files: files.len(),
            ..ScanStats::default()
        };

        let mut units = Vec::new();
        for (file_idx, candidate) in files.iter().enumerate() {
            let Some(content) = self.read(&candidate.path).await else {
                stats.unreadable_files += 1;
                continue;
            };
            let language = language_for(&candidate.path);
            for (chunk_idx, chunk) in chunk_file(&candidate.path, &content, self.chunk_lines)
                .into_iter()
                .enumerate()
            {
                units.push(Unit {
                    file: file_idx,
                    chunk: chunk_idx,
                    request: ChunkRequest {
                        brief: Arc::clone(brief),
                        chunk,
                        language: language.to_string(),
                    },
                });
            }
        }
        stats.chunks = units.len();
        tracing::info!(%pass, files = files.len(), chunks = units.len(), "scanning");

        let mut done: Vec<(usize, usize, CodeChunk, Attempted<ChunkOutcome>)> =
            stream::iter(units)
                .map(|unit| async move {
                    let attempted = self.policy.classify(&self.classifier, &unit.request).await;
                    (unit.file, unit.chunk, unit.request.chunk, attempted)
                })
                .buffer_unordered(self.workers)
                .collect()
                .await;
        done.sort_by_key(|(file, chunk, _, _)| (*file, *chunk));

        let mut violations = Vec::new();
        for (_, _, chunk, attempted) in done {
            stats.invocations += attempted.attempts as usize;
            match attempted.value {
                ChunkOutcome::Classified(Classification::Violations(findings)) => {
                    violations.extend(findings.into_iter().map(|f| Violation {
                        file: chunk.file_path.clone(),
                        line: chunk.absolute_line(f.line_offset),
                        violating_code: f.violating_code,
                        explanation: f.explanation,
                        rule_violated: f.rule_violated,
                        pass,
                    }));
                }
                ChunkOutcome::Classified(Classification::Unparsable { raw }) => {
                    stats.unparsable_replies += 1;
                    tracing::warn!(
                        file = %chunk.file_path,
                        lines = %format!("{}-{}", chunk.start_line, chunk.end_line),
                        reply = %raw.chars().take(200).collect::<String>(),
                        "unparsable classifier reply"
                    );
                }
                ChunkOutcome::Degraded(reason) => {
                    stats.degraded_chunks += 1;
                    tracing::warn!(
                        file = %chunk.file_path,
                        start_line = chunk.start_line,
                        attempts = attempted.attempts,
                        %reason,
                        "chunk skipped"
                    );
                }
            }
        }

        tracing::info!(%pass, violations = violations.len(), "scan finished");
        PassScan { violations, stats }
    }

    async fn read(&self, rel: &str) -> Option<String> {
        let path = self.root.join(rel);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(file = rel, error = %e, "cannot read file");
                return None;
            }
        };
        if bytes.contains(&0) {
            tracing::warn!(file = rel, "binary file, skipping");
            return None;
        }
        match String::from_utf8(bytes) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(file = rel, "file is not valid UTF-8, replacing bad bytes");
                Some(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }
}
