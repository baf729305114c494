//! The two-pass audit state machine.
//!
//! ```text
//! Init → PatternGen → Pass1Scan → Discovery → Pass2Scan → Merge → Done
//!   └──────────┴───────────┴──────────┴───────────┴─────────┴──→ Failed
//! ```
//!
//! Every productive state runs in sequence. The checkout is owned by the run
//! future, so it is released on success, on failure, and when the future is
//! dropped. [`AuditMode::Full`] visits the same states; pass 1 takes every
//! eligible file and discovery selects nothing.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use guard_checkout::CheckoutProvider;
use guard_classifier::{Classifier, HintSource, RetryPolicy};
use guard_config::ScanConfig;
use guard_core::ComplianceBrief;
use guard_core::entities::{AuditReport, CandidatePattern, FileCandidate, PassReport};
use guard_core::enums::{AuditMode, AuditOutcome, AuditState, MatchReason, ScanPass};
use guard_core::errors::CoreError;
use guard_scan::{PassScan, Resolution, ScanOrchestrator, SourceTree, resolve};

use crate::error::{AuditError, AuditFailure};
use crate::merge::{merge, summary};
use crate::selector::CandidateSelector;
use crate::sink::ReportSink;

/// The report under construction plus the current state.
struct Run {
    state: AuditState,
    report: AuditReport,
}

impl Run {
    fn start(repository: &str, brief: ComplianceBrief, mode: AuditMode) -> Self {
        let mut report = AuditReport::new(repository, brief);
        report.mode = mode;
        report.states.push(AuditState::Init);
        Self {
            state: AuditState::Init,
            report,
        }
    }

    fn advance(&mut self, next: AuditState) -> Result<(), AuditError> {
        if !self.state.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.state,
                to: next,
            }
            .into());
        }
        tracing::debug!(from = %self.state, to = %next, "audit state");
        self.state = next;
        self.report.states.push(next);
        Ok(())
    }

    /// Recompute merged violations, stats, and summary from the passes so far.
    fn settle(&mut self) {
        let (violations, stats) = merge(&self.report.pass1, &self.report.pass2);
        self.report.summary = summary(&stats);
        self.report.violations = violations;
        self.report.stats = stats;
    }

    fn fail(mut self, error: AuditError) -> AuditFailure {
        tracing::error!(state = %self.state, error = %error, "audit failed");
        if !self.state.is_terminal() {
            self.state = AuditState::Failed;
            self.report.states.push(AuditState::Failed);
        }
        self.settle();
        self.report.outcome = AuditOutcome::Failed;
        self.report.finished_at = Some(Utc::now());
        AuditFailure {
            error,
            partial: Box::new(self.report),
        }
    }
}

/// Runs audits with one checkout provider, classifier, hint source, and sink.
#[derive(Debug)]
pub struct AuditCoordinator<P, C, H, S> {
    checkout: P,
    classifier: C,
    selector: CandidateSelector<H>,
    sink: S,
    scan: ScanConfig,
    policy: RetryPolicy,
    mode: AuditMode,
}

impl<P, C, H, S> AuditCoordinator<P, C, H, S>
where
    P: CheckoutProvider,
    C: Classifier,
    H: HintSource,
    S: ReportSink,
{
    pub fn new(checkout: P, classifier: C, hints: H, sink: S) -> Self {
        Self {
            checkout,
            classifier,
            selector: CandidateSelector::new(hints),
            sink,
            scan: ScanConfig::default(),
            policy: RetryPolicy::default(),
            mode: AuditMode::default(),
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: AuditMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_scan_config(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn checkout(&self) -> &P {
        &self.checkout
    }

    /// Audit `source` (a URL or local directory) against `brief`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditFailure`] carrying the partial report when the checkout
    /// cannot be acquired or walked, or when the report cannot be recorded.
    pub async fn run(&self, source: &str, brief: ComplianceBrief) -> Result<AuditReport, AuditFailure> {
        let mut run = Run::start(source, brief, self.mode);
        match self.drive(source, &mut run).await {
            Ok(()) => {
                tracing::info!(repository = source, violations = run.report.violations.len(), "audit complete");
                Ok(run.report)
            }
            Err(error) => Err(run.fail(error)),
        }
    }

    async fn drive(&self, source: &str, run: &mut Run) -> Result<(), AuditError> {
        let session = self.checkout.acquire(source).await?;
        let brief = Arc::new(run.report.brief.clone());

        run.advance(AuditState::PatternGen)?;
        let patterns = match self.mode {
            AuditMode::Hybrid => self.selector.initial(&brief).await,
            AuditMode::Full => BTreeSet::from([CandidatePattern::Everything]),
        };

        run.advance(AuditState::Pass1Scan)?;
        // Built before the empty check: pass 2 reuses both.
        let tree = SourceTree::collect(session.root(), &self.scan)?;
        let orchestrator =
            ScanOrchestrator::new(&self.classifier, tree.root(), &self.scan, self.policy);

        let nothing = BTreeSet::new();
        let pass1_files = self.resolve(&tree, &patterns, MatchReason::Pattern, ScanPass::First, &nothing);
        run.report.pass1 = scan_pass(&orchestrator, pass1_files, &brief, ScanPass::First).await;

        run.advance(AuditState::Discovery)?;
        let refined = match self.mode {
            AuditMode::Hybrid => self.selector.refine(&brief, &run.report.pass1.violations).await,
            AuditMode::Full => BTreeSet::new(),
        };
        let scanned: BTreeSet<String> =
            run.report.pass1.files.iter().map(|f| f.path.clone()).collect();
        let pass2_files =
            self.resolve(&tree, &refined, MatchReason::Discovered, ScanPass::Second, &scanned);

        run.advance(AuditState::Pass2Scan)?;
        run.report.pass2 = scan_pass(&orchestrator, pass2_files, &brief, ScanPass::Second).await;

        run.advance(AuditState::Merge)?;
        run.settle();
        let mut finished = run.report.clone();
        finished.states.push(AuditState::Done);
        finished.outcome = AuditOutcome::Completed;
        finished.finished_at = Some(Utc::now());
        self.sink.record(&finished).await?;

        run.advance(AuditState::Done)?;
        run.report = finished;
        drop(session);
        Ok(())
    }

    fn resolve(
        &self,
        tree: &SourceTree,
        patterns: &BTreeSet<CandidatePattern>,
        reason: MatchReason,
        pass: ScanPass,
        exclude: &BTreeSet<String>,
    ) -> Vec<FileCandidate> {
        resolve(
            tree,
            patterns,
            &Resolution {
                reason,
                pass,
                exclude,
                limit: self.scan.max_files_per_pass,
            },
        )
    }
}

async fn scan_pass<C: Classifier>(
    orchestrator: &ScanOrchestrator<C>,
    files: Vec<FileCandidate>,
    brief: &Arc<ComplianceBrief>,
    pass: ScanPass,
) -> PassReport {
    let PassScan { violations, stats } = if files.is_empty() {
        tracing::info!(%pass, "no candidate files");
        PassScan::default()
    } else {
        orchestrator.scan(&files, brief, pass).await
    };
    PassReport {
        pass,
        files,
        violations,
        stats,
    }
}
