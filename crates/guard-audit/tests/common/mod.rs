//! Shared fakes for the audit suites.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use guard_checkout::{CheckoutError, CheckoutProvider, ScanSession};
use guard_classifier::{ChunkRequest, Classification, Classifier, ClassifierError, Finding, RetryPolicy};
use guard_config::ScanConfig;
use guard_core::retry::RetryConfig;

/// Write `files` under `dir`, creating parent directories.
pub fn write_tree(dir: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = dir.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("directory should create");
        }
        fs::write(full, content).expect("fixture should write");
    }
}

/// Borrows a fixed directory regardless of the requested source.
pub struct FixtureCheckout(pub PathBuf);

impl CheckoutProvider for FixtureCheckout {
    async fn acquire(&self, source: &str) -> Result<ScanSession, CheckoutError> {
        Ok(ScanSession::borrowed(self.0.canonicalize()?, source))
    }
}

/// Materialises `files` into a fresh temporary checkout on every acquire and
/// remembers where.
pub struct TempCheckout {
    pub files: Vec<(String, String)>,
    pub last_root: Mutex<Option<PathBuf>>,
}

impl TempCheckout {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
                .collect(),
            last_root: Mutex::new(None),
        }
    }

    pub fn last_root(&self) -> PathBuf {
        self.last_root.lock().expect("lock should not be poisoned").clone().expect("root should be recorded")
    }
}

impl CheckoutProvider for TempCheckout {
    async fn acquire(&self, source: &str) -> Result<ScanSession, CheckoutError> {
        let temp = tempfile::TempDir::new()?;
        let files: Vec<(&str, &str)> =
            self.files.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
        write_tree(temp.path(), &files);
        let root = temp.path().canonicalize()?;
        *self.last_root.lock().expect("lock should not be poisoned") = Some(root.clone());
        Ok(ScanSession::ephemeral(temp, root, source))
    }
}

/// Always fails to check out.
pub struct Unreachable;

impl CheckoutProvider for Unreachable {
    async fn acquire(&self, source: &str) -> Result<ScanSession, CheckoutError> {
        Err(CheckoutError::Clone {
            url: source.to_string(),
            reason: "connection refused".into(),
        })
    }
}

/// Flags every line containing one of `needles`, citing the first statement
/// of the brief.
pub struct NeedleClassifier {
    pub needles: Vec<&'static str>,
}

impl NeedleClassifier {
    pub fn new(needles: &[&'static str]) -> Self {
        Self {
            needles: needles.to_vec(),
        }
    }
}

impl Classifier for NeedleClassifier {
    async fn classify(&self, request: &ChunkRequest) -> Result<Classification, ClassifierError> {
        let rule = request.brief.statements()[0].clone();
        let findings = request
            .chunk
            .text
            .lines()
            .enumerate()
            .filter(|(_, line)| self.needles.iter().any(|n| line.contains(n)))
            .map(|(i, line)| Finding {
                line_offset: u32::try_from(i + 1).ok(),
                violating_code: line.trim().to_string(),
                explanation: "matches a prohibited pattern".into(),
                rule_violated: rule.clone(),
            })
            .collect();
        Ok(Classification::Violations(findings))
    }
}

/// Never answers.
pub struct Hang;

impl Classifier for Hang {
    async fn classify(&self, _request: &ChunkRequest) -> Result<Classification, ClassifierError> {
        std::future::pending().await
    }
}

pub fn scan_config() -> ScanConfig {
    ScanConfig {
        chunk_lines: 20,
        workers: 3,
        ..ScanConfig::default()
    }
}

pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        retry: RetryConfig {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        },
        timeout: Duration::from_secs(30),
    }
}

/// Nine harmless lines followed by `line10`.
pub fn with_line_10(line10: &str) -> String {
    let mut lines: Vec<String> = (1..=9).map(|i| format!("x{i} = {i}")).collect();
    lines.push(line10.to_string());
    lines.push("x11 = 11".into());
    lines.join("\n")
}
