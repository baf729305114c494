use std::path::Path;

use anyhow::{Context, bail};
use guard_core::responses::IngestResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::IngestArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `grd ingest`.
pub async fn handle(args: &IngestArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.source.is_some() && args.paths.len() > 1 {
        bail!("--source names a single document; pass one path or omit it");
    }

    let store = ctx.chunk_store()?;
    let progress = Progress::bar(u64::try_from(args.paths.len()).unwrap_or(u64::MAX), "ingesting");
    let mut responses = Vec::with_capacity(args.paths.len());

    for path in &args.paths {
        let source = args.source.clone().unwrap_or_else(|| source_id(path));
        progress.set_message(&source);

        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {} as UTF-8 text", path.display()))?;
        let outcome = store
            .ingest(&text, &source)
            .await
            .with_context(|| format!("failed to ingest {}", path.display()))?;
        if outcome.failed > 0 {
            tracing::warn!(source, failed = outcome.failed, "some windows could not be embedded");
        }
        let total_chunks = store.stats().await?.chunks;

        responses.push(IngestResponse {
            source,
            added: outcome.added,
            skipped: outcome.skipped,
            failed: outcome.failed,
            total_chunks,
        });
        progress.inc(1);
    }
    progress.finish_clear();

    match responses.as_slice() {
        [single] => output(single, flags.format),
        many => output(&many, flags.format),
    }
}

/// Default document id: the file name.
fn source_id(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
