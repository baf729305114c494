use guard_core::responses::{QueryHit, QueryResponse};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::QueryArgs;
use crate::commands::shared::limit::{effective_limit, fallback_k};
use crate::context::AppContext;
use crate::output::output;

/// Handle `grd query`.
pub async fn handle(args: &QueryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let k = effective_limit(args.k, flags.limit, fallback_k(ctx.config.store.query_k));
    let k = usize::try_from(k)?;
    let store = ctx.chunk_store()?;

    let hits = match &args.source {
        Some(source) => store.query_source(&args.text, k, source).await?,
        None => store.query(&args.text, k).await?,
    };

    let results = hits.into_iter().map(QueryHit::from).collect::<Vec<_>>();
    output(
        &QueryResponse {
            query: args.text.clone(),
            total_results: results.len(),
            results,
        },
        flags.format,
    )
}
