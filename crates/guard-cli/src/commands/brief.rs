use anyhow::Context;
use guard_audit::{BriefBuilder, DerivedBrief};
use guard_core::responses::BriefResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::BriefArgs;
use crate::commands::shared::limit::{effective_limit, fallback_k};
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `grd brief`.
pub async fn handle(args: &BriefArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let k = effective_limit(args.k, flags.limit, fallback_k(ctx.config.store.query_k));
    let derived = derive(ctx, &args.question, usize::try_from(k)?, args.source.as_deref()).await?;

    output(
        &BriefResponse {
            question: args.question.clone(),
            context_chunks: derived.context_chunks,
            brief: derived.brief,
        },
        flags.format,
    )
}

/// Retrieve regulatory context for `question` and have the model condense it
/// into requirement statements.
pub async fn derive(
    ctx: &AppContext,
    question: &str,
    k: usize,
    source: Option<&str>,
) -> anyhow::Result<DerivedBrief> {
    let store = ctx.chunk_store()?;
    let model = ctx.model()?;

    let progress = Progress::spinner("deriving compliance brief");
    let result = BriefBuilder::new(&store, &model)
        .derive(question, k, source)
        .await;

    match result {
        Ok(derived) => {
            progress.finish_clear();
            tracing::info!(
                statements = derived.brief.len(),
                context_chunks = derived.context_chunks,
                "compliance brief derived"
            );
            Ok(derived)
        }
        Err(error) => {
            progress.finish_err("brief derivation failed");
            Err(error).context("failed to derive a compliance brief")
        }
    }
}
