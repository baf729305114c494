use std::sync::Arc;

use anyhow::{Context, bail};
use guard_audit::AuditCoordinator;
use guard_checkout::{GitCheckout, RepositoryCheckout};
use guard_classifier::{Classifier, HintSource, LlmClassifier, LlmHintSource, NoHints, RetryPolicy};
use guard_config::ScanConfig;
use guard_core::ComplianceBrief;
use guard_core::entities::AuditReport;

use crate::cli::root_commands::AuditArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::brief;
use crate::commands::shared::limit::fallback_k;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `grd audit`.
///
/// A failed run still prints its partial report before the error.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let brief = resolve_brief(args, ctx).await?;
    if brief.is_empty() {
        bail!("the compliance brief has no requirements");
    }

    let model = Arc::new(ctx.model()?);
    let classifier = LlmClassifier::new(Arc::clone(&model));
    let result = if args.no_hints {
        run(args, ctx, classifier, NoHints, brief).await
    } else {
        run(args, ctx, classifier, LlmHintSource::new(model), brief).await
    };

    match result {
        Ok(report) => render_report(&report, flags),
        Err(failure) => {
            render_report(&failure.partial, flags)?;
            Err(failure.into())
        }
    }
}

async fn run<C: Classifier, H: HintSource>(
    args: &AuditArgs,
    ctx: &AppContext,
    classifier: C,
    hints: H,
    brief: ComplianceBrief,
) -> Result<AuditReport, guard_audit::AuditFailure> {
    let mut git = GitCheckout::new();
    if args.full_history {
        git = git.full_history();
    }

    let coordinator = AuditCoordinator::new(RepositoryCheckout::new(git), classifier, hints, ctx.ledger())
        .with_scan_config(scan_config(&ctx.config.scan, args.workers))
        .with_retry_policy(RetryPolicy::from_config(&ctx.config.classifier))
        .with_mode(args.mode.into());

    let progress = Progress::spinner(&format!("auditing {}", args.repository));
    let result = coordinator.run(&args.repository, brief).await;
    match &result {
        Ok(report) => progress.finish_ok(report.summary.lines().last().unwrap_or("audit finished")),
        Err(_) => progress.finish_err("audit failed"),
    }
    result
}

fn scan_config(base: &ScanConfig, workers: Option<usize>) -> ScanConfig {
    let mut scan = base.clone();
    if let Some(workers) = workers {
        scan.workers = workers.max(1);
    }
    scan
}

/// `--brief-file`, then `--requirement`, then a brief derived from `--question`.
async fn resolve_brief(args: &AuditArgs, ctx: &AppContext) -> anyhow::Result<ComplianceBrief> {
    if let Some(path) = &args.brief_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read brief file {}", path.display()))?;
        return Ok(ComplianceBrief::parse(&text));
    }

    if !args.requirement.is_empty() {
        return Ok(ComplianceBrief::new(args.requirement.iter().map(String::as_str)));
    }

    if let Some(question) = &args.question {
        let k = usize::try_from(fallback_k(ctx.config.store.query_k))?;
        let derived = brief::derive(ctx, question, k, args.source.as_deref()).await?;
        return Ok(derived.brief);
    }

    bail!("no compliance brief given; pass --requirement, --brief-file or --question")
}

fn render_report(report: &AuditReport, flags: &GlobalFlags) -> anyhow::Result<()> {
    if flags.format == OutputFormat::Table {
        output(&report.violations, flags.format)?;
        println!("\n{}", report.summary);
        return Ok(());
    }
    output(report, flags.format)
}

#[cfg(test)]
mod tests {
    use guard_config::ScanConfig;

    use super::scan_config;

    #[test]
    fn worker_override_is_clamped_to_one() {
        let base = ScanConfig::default();
        assert_eq!(scan_config(&base, Some(0)).workers, 1);
        assert_eq!(scan_config(&base, Some(8)).workers, 8);
        assert_eq!(scan_config(&base, None).workers, base.workers);
    }
}
