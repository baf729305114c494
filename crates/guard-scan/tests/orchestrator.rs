//! Orchestrator behaviour with scripted classifiers over real fixture files.

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use guard_classifier::{
    ChunkRequest, Classification, Classifier, ClassifierError, Finding, RetryPolicy,
};
use guard_config::ScanConfig;
use guard_core::ComplianceBrief;
use guard_core::entities::FileCandidate;
use guard_core::enums::{MatchReason, ScanPass};
use guard_core::retry::RetryConfig;
use guard_scan::ScanOrchestrator;
use pretty_assertions::assert_eq;

/// Flags every line containing `needle`, after a delay derived from the line
/// position so completions arrive out of order.
struct NeedleClassifier {
    needle: &'static str,
    calls: Mutex<HashMap<(String, u32), usize>>,
}

impl NeedleClassifier {
    fn new(needle: &'static str) -> Self {
        Self {
            needle,
            calls: Mutex::new(HashMap::new()),
        }
    }
}

impl Classifier for NeedleClassifier {
    async fn classify(&self, request: &ChunkRequest) -> Result<Classification, ClassifierError> {
        let chunk = &request.chunk;
        *self
            .calls
            .lock()
            .expect("lock should not be poisoned")
            .entry((chunk.file_path.clone(), chunk.start_line))
            .or_default() += 1;
        let delay = u64::from((chunk.start_line * 7 + chunk.file_path.len() as u32) % 13);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let findings = chunk
            .text
            .lines()
            .enumerate()
            .filter(|(_, l)| l.contains(self.needle))
            .map(|(i, l)| Finding {
                line_offset: Some(u32::try_from(i + 1).expect("conversion should fit")),
                violating_code: l.trim().to_string(),
                explanation: format!("contains {}", self.needle),
                rule_violated: request.brief.statements()[0].clone(),
            })
            .collect();
        Ok(Classification::Violations(findings))
    }
}

fn config(workers: usize) -> ScanConfig {
    ScanConfig {
        chunk_lines: 20,
        workers,
        ..ScanConfig::default()
    }
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        retry: RetryConfig {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        },
        timeout: Duration::from_secs(5),
    }
}

fn candidates(paths: &[&str]) -> Vec<FileCandidate> {
    paths
        .iter()
        .map(|p| FileCandidate {
            path: (*p).to_string(),
            match_reason: MatchReason::Pattern,
            pass: ScanPass::First,
        })
        .collect()
}

fn brief() -> Arc<ComplianceBrief> {
    Arc::new(ComplianceBrief::new(["Passwords must be hashed before storage"]))
}

/// `lines` lines of filler with `password` on the given 1-based lines.
fn source(lines: u32, hits: &[u32]) -> String {
    (1..=lines)
        .map(|i| {
            if hits.contains(&i) {
                format!("password = req.form['password']  # {i}")
            } else {
                format!("x{i} = {i}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn lines_are_absolute_and_order_is_deterministic() {
    let tmp = tempfile::tempdir().expect("tempdir should create");
    fs::write(tmp.path().join("auth.py"), source(70, &[10, 45, 61])).expect("fixture should write");
    fs::write(tmp.path().join("db.py"), source(25, &[3, 22])).expect("fixture should write");
    let files = candidates(&["auth.py", "db.py"]);

    let mut runs = Vec::new();
    for workers in [1, 3, 8] {
        let orchestrator = ScanOrchestrator::new(
            NeedleClassifier::new("password"),
            tmp.path(),
            &config(workers),
            fast_policy(),
        );
        let scan = orchestrator.scan(&files, &brief(), ScanPass::First).await;
        let located: Vec<_> = scan
            .violations
            .iter()
            .map(|v| (v.file.clone(), v.line))
            .collect();
        runs.push(located);
        assert_eq!(scan.stats.files, 2);
        assert_eq!(scan.stats.chunks, 4 + 2);
        assert_eq!(scan.stats.invocations, 6);
    }
    let expected = vec![
        ("auth.py".to_string(), 10),
        ("auth.py".to_string(), 45),
        ("auth.py".to_string(), 61),
        ("db.py".to_string(), 3),
        ("db.py".to_string(), 22),
    ];
    for run in runs {
        assert_eq!(run, expected);
    }
}

#[tokio::test]
async fn every_chunk_is_classified_exactly_once() {
    let tmp = tempfile::tempdir().expect("tempdir should create");
    fs::write(tmp.path().join("a.py"), source(90, &[])).expect("fixture should write");
    let classifier = Arc::new(NeedleClassifier::new("password"));
    let orchestrator =
        ScanOrchestrator::new(Arc::clone(&classifier), tmp.path(), &config(4), fast_policy());

    orchestrator
        .scan(&candidates(&["a.py"]), &brief(), ScanPass::First)
        .await;

    let calls = classifier.calls.lock().expect("lock should not be poisoned");
    assert_eq!(calls.len(), 5);
    assert!(calls.values().all(|&n| n == 1));
}

#[tokio::test]
async fn unreadable_files_are_skipped() {
    let tmp = tempfile::tempdir().expect("tempdir should create");
    fs::write(tmp.path().join("bin.py"), [0xff, 0xfe, 0x00, 0x80]).expect("fixture should write");
    fs::write(tmp.path().join("ok.py"), source(5, &[2])).expect("fixture should write");
    let orchestrator = ScanOrchestrator::new(
        NeedleClassifier::new("password"),
        tmp.path(),
        &config(2),
        fast_policy(),
    );

    let scan = orchestrator
        .scan(
            &candidates(&["bin.py", "missing.py", "ok.py"]),
            &brief(),
            ScanPass::Second,
        )
        .await;
    assert_eq!(scan.stats.unreadable_files, 2);
    assert_eq!(scan.violations.len(), 1);
    assert_eq!(scan.violations[0].file, "ok.py");
    assert_eq!(scan.violations[0].line, 2);
    assert_eq!(scan.violations[0].pass, ScanPass::Second);
}

#[tokio::test]
async fn stray_latin1_bytes_do_not_hide_a_file() {
    let tmp = tempfile::tempdir().expect("tempdir should create");
    fs::write(
        tmp.path().join("client.py"),
        b"# caf\xe9 module\nURL = 'http://api.internal'\n",
    )
    .expect("fixture should write");
    let orchestrator = ScanOrchestrator::new(
        NeedleClassifier::new("http://"),
        tmp.path(),
        &config(1),
        fast_policy(),
    );

    let scan = orchestrator
        .scan(&candidates(&["client.py"]), &brief(), ScanPass::First)
        .await;
    assert_eq!(scan.stats.unreadable_files, 0);
    assert_eq!(scan.violations.len(), 1);
    assert_eq!(scan.violations[0].line, 2);
}

/// Sleeps past any reasonable deadline.
struct Stalled {
    calls: AtomicUsize,
}

impl Classifier for Stalled {
    async fn classify(&self, _r: &ChunkRequest) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(Classification::Violations(vec![]))
    }
}

#[tokio::test]
async fn timed_out_chunk_is_sent_once_and_degraded() {
    let tmp = tempfile::tempdir().expect("tempdir should create");
    fs::write(tmp.path().join("a.py"), "x = 1\n").expect("fixture should write");
    let classifier = Arc::new(Stalled {
        calls: AtomicUsize::new(0),
    });
    let policy = RetryPolicy {
        retry: RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        },
        timeout: Duration::from_millis(20),
    };
    let orchestrator =
        ScanOrchestrator::new(Arc::clone(&classifier), tmp.path(), &config(1), policy);

    let scan = orchestrator
        .scan(&candidates(&["a.py"]), &brief(), ScanPass::First)
        .await;
    assert!(scan.violations.is_empty());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    assert_eq!(scan.stats.invocations, 1);
    assert_eq!(scan.stats.degraded_chunks, 1);
}

/// Replies with prose for the first chunk and never answers for the rest.
struct Troubled {
    calls: AtomicUsize,
}

impl Classifier for Troubled {
    async fn classify(&self, request: &ChunkRequest) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.chunk.start_line == 1 {
            Ok(Classification::Unparsable {
                raw: "I think it is fine".into(),
            })
        } else {
            Err(ClassifierError::transient("connection reset"))
        }
    }
}

#[tokio::test]
async fn bad_replies_and_exhausted_retries_degrade_to_empty() {
    let tmp = tempfile::tempdir().expect("tempdir should create");
    fs::write(tmp.path().join("a.py"), source(40, &[5, 30])).expect("fixture should write");
    let classifier = Arc::new(Troubled {
        calls: AtomicUsize::new(0),
    });
    let orchestrator =
        ScanOrchestrator::new(Arc::clone(&classifier), tmp.path(), &config(2), fast_policy());

    let scan = orchestrator
        .scan(&candidates(&["a.py"]), &brief(), ScanPass::First)
        .await;
    assert!(scan.violations.is_empty());
    assert_eq!(scan.stats.chunks, 2);
    assert_eq!(scan.stats.unparsable_replies, 1);
    assert_eq!(scan.stats.degraded_chunks, 1);
    // one reply for the first chunk, two attempts for the second
    assert_eq!(scan.stats.invocations, 3);
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn missing_offsets_clamp_into_the_chunk() {
    struct Vague;
    impl Classifier for Vague {
        async fn classify(&self, _r: &ChunkRequest) -> Result<Classification, ClassifierError> {
            Ok(Classification::Violations(vec![
                Finding {
                    line_offset: None,
                    violating_code: "a".into(),
                    explanation: "b".into(),
                    rule_violated: "R1".into(),
                },
                Finding {
                    line_offset: Some(999),
                    violating_code: "a".into(),
                    explanation: "b".into(),
                    rule_violated: "R2".into(),
                },
            ]))
        }
    }

    let tmp = tempfile::tempdir().expect("tempdir should create");
    fs::write(tmp.path().join("a.py"), source(30, &[])).expect("fixture should write");
    let orchestrator = ScanOrchestrator::new(Vague, tmp.path(), &config(1), fast_policy());
    let scan = orchestrator
        .scan(&candidates(&["a.py"]), &brief(), ScanPass::First)
        .await;
    let lines: Vec<_> = scan.violations.iter().map(|v| (v.line, v.rule_violated.as_str())).collect();
    assert_eq!(lines, vec![(1, "R1"), (20, "R2"), (21, "R1"), (30, "R2")]);
}
