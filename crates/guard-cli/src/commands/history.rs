use guard_core::entities::Violation;
use guard_core::responses::HistoryResponse;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::HistoryArgs;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct RunViolationsResponse {
    run: String,
    total_violations: usize,
    violations: Vec<Violation>,
}

/// Handle `grd history`.
pub async fn handle(args: &HistoryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let ledger = ctx.ledger();

    if let Some(run) = &args.run {
        let violations = ledger.violations(run).await?;
        return output(
            &RunViolationsResponse {
                run: run.clone(),
                total_violations: violations.len(),
                violations,
            },
            flags.format,
        );
    }

    let limit = effective_limit(None, flags.limit, ctx.config.general.default_limit);
    let runs = ledger.recent(limit).await?;
    output(&HistoryResponse { runs }, flags.format)
}
