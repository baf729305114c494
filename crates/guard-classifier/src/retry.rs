//! Deadline and bounded retry around classifier calls.
//!
//! Only [`ClassifierError::Transient`] is retried: the request never produced
//! a reply. A missed deadline is final because the request may already have
//! been delivered, and so is a reply of any shape. No chunk is classified
//! twice.

use std::future::Future;
use std::time::Duration;

use guard_config::ClassifierConfig;
use guard_core::retry::RetryConfig;

use crate::classifier::{ChunkRequest, Classification, Classifier};
use crate::error::ClassifierError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry: RetryConfig,
    /// Deadline for one attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

/// What became of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Classified(Classification),
    /// Retries exhausted or request rejected. Counts as no violation.
    Degraded(String),
}

/// A value plus the number of attempts spent on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

impl RetryPolicy {
    #[must_use]
    pub const fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            retry: RetryConfig {
                max_attempts: config.max_attempts,
                base_delay: config.base_delay(),
                max_delay: config.max_delay(),
            },
            timeout: config.timeout(),
        }
    }

    /// Run `call` until it answers, fails for good, or attempts run out.
    ///
    /// A server-supplied wait longer than `max_delay` ends the loop at once.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Attempted<Result<T, ClassifierError>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClassifierError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let Ok(result) = tokio::time::timeout(self.timeout, call()).await else {
                tracing::warn!(attempt, timeout = ?self.timeout, "classifier call timed out");
                return Attempted {
                    value: Err(ClassifierError::TimedOut(format!(
                        "no reply within {}ms",
                        self.timeout.as_millis()
                    ))),
                    attempts: attempt,
                };
            };
            let (reason, retry_after) = match result {
                Err(ClassifierError::Transient {
                    reason,
                    retry_after,
                }) if self.retry.should_retry(attempt) => (reason, retry_after),
                other => {
                    return Attempted {
                        value: other,
                        attempts: attempt,
                    };
                }
            };
            let backoff = self.retry.delay_after(attempt);
            let delay = match retry_after {
                Some(wait) if wait > self.retry.max_delay => {
                    tracing::warn!(attempt, ?wait, "server wait exceeds max delay, giving up");
                    return Attempted {
                        value: Err(ClassifierError::Transient {
                            reason,
                            retry_after,
                        }),
                        attempts: attempt,
                    };
                }
                Some(wait) => backoff.max(wait),
                None => backoff,
            };
            tracing::debug!(attempt, error = %reason, ?delay, "retrying");
            tokio::time::sleep(delay).await;
        }
    }

    /// Classify one chunk, folding every failure into [`ChunkOutcome`].
    pub async fn classify<C: Classifier>(
        &self,
        classifier: &C,
        request: &ChunkRequest,
    ) -> Attempted<ChunkOutcome> {
        let Attempted { value, attempts } = self.run(|| classifier.classify(request)).await;
        let outcome = match value {
            Ok(classification) => ChunkOutcome::Classified(classification),
            Err(ClassifierError::Parse(raw)) => {
                ChunkOutcome::Classified(Classification::Unparsable { raw })
            }
            Err(e) => ChunkOutcome::Degraded(e.to_string()),
        };
        Attempted {
            value: outcome,
            attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use guard_core::ComplianceBrief;
    use guard_core::entities::CodeChunk;
    use pretty_assertions::assert_eq;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            retry: RetryConfig {
                max_attempts,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
            timeout: Duration::from_millis(200),
        }
    }

    /// Fails transiently `failures` times, then answers.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        answer: Result<Classification, fn() -> ClassifierError>,
    }

    impl Classifier for Flaky {
        async fn classify(&self, _r: &ChunkRequest) -> Result<Classification, ClassifierError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err(ClassifierError::transient("connection reset"));
            }
            self.answer.clone().map_err(|make| make())
        }
    }

    fn flaky(failures: u32, answer: Result<Classification, fn() -> ClassifierError>) -> Flaky {
        Flaky {
            failures,
            calls: AtomicU32::new(0),
            answer,
        }
    }

    fn request() -> ChunkRequest {
        ChunkRequest {
            brief: Arc::new(ComplianceBrief::new(["R"])),
            chunk: CodeChunk {
                file_path: "a.py".into(),
                start_line: 1,
                end_line: 1,
                text: "x".into(),
            },
            language: "python".into(),
        }
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_a_reply() {
        let c = flaky(2, Ok(Classification::Violations(vec![])));
        let out = fast(3).classify(&c, &request()).await;
        assert_eq!(out.attempts, 3);
        assert_eq!(out.value, ChunkOutcome::Classified(Classification::Violations(vec![])));
    }

    #[tokio::test]
    async fn exhausted_retries_degrade() {
        let c = flaky(10, Ok(Classification::Violations(vec![])));
        let out = fast(3).classify(&c, &request()).await;
        assert_eq!(out.attempts, 3);
        assert_eq!(c.calls.load(Ordering::SeqCst), 3);
        assert!(matches!(out.value, ChunkOutcome::Degraded(_)));
    }

    #[tokio::test]
    async fn parse_failures_are_never_resent() {
        let c = flaky(0, Err(|| ClassifierError::Parse("nope".into())));
        let out = fast(5).classify(&c, &request()).await;
        assert_eq!(out.attempts, 1);
        assert_eq!(
            out.value,
            ChunkOutcome::Classified(Classification::Unparsable { raw: "nope".into() })
        );
    }

    #[tokio::test]
    async fn rejections_are_not_retried() {
        let c = flaky(0, Err(|| ClassifierError::Rejected {
            status: 401,
            message: "bad key".into(),
        }));
        let out = fast(5).classify(&c, &request()).await;
        assert_eq!(out.attempts, 1);
        assert!(matches!(out.value, ChunkOutcome::Degraded(_)));
    }

    struct Slow;

    impl Classifier for Slow {
        async fn classify(&self, _r: &ChunkRequest) -> Result<Classification, ClassifierError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Classification::Violations(vec![]))
        }
    }

    #[tokio::test]
    async fn timeouts_are_never_resent() {
        let mut policy = fast(3);
        policy.timeout = Duration::from_millis(10);
        let out = policy.classify(&Slow, &request()).await;
        assert_eq!(out.attempts, 1);
        assert!(matches!(out.value, ChunkOutcome::Degraded(ref m) if m.contains("no reply")));
    }

    /// Always rate limited with the given server wait.
    struct Throttled {
        wait: Duration,
        calls: AtomicU32,
    }

    impl Classifier for Throttled {
        async fn classify(&self, _r: &ChunkRequest) -> Result<Classification, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClassifierError::Transient {
                reason: "rate limited".into(),
                retry_after: Some(self.wait),
            })
        }
    }

    #[tokio::test]
    async fn server_wait_is_honoured_between_attempts() {
        let mut policy = fast(2);
        policy.retry.max_delay = Duration::from_millis(100);
        let throttled = Throttled {
            wait: Duration::from_millis(40),
            calls: AtomicU32::new(0),
        };

        let started = std::time::Instant::now();
        let out = policy.classify(&throttled, &request()).await;
        assert_eq!(out.attempts, 2);
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert!(matches!(out.value, ChunkOutcome::Degraded(_)));
    }

    #[tokio::test]
    async fn server_wait_beyond_max_delay_degrades_at_once() {
        let throttled = Throttled {
            wait: Duration::from_secs(60),
            calls: AtomicU32::new(0),
        };
        let out = fast(3).classify(&throttled, &request()).await;
        assert_eq!(out.attempts, 1);
        assert_eq!(throttled.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(out.value, ChunkOutcome::Degraded(ref m) if m.contains("rate limited")));
    }

    #[test]
    fn built_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retry.max_attempts, 3);
        assert_eq!(policy.timeout, Duration::from_secs(60));
    }
}
