use anyhow::bail;
use guard_core::responses::{ClearResponse, StoreStatsResponse};
use guard_store::ChunkBackend;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StoreCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `grd store`.
pub async fn handle(action: &StoreCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let backend = ctx.backend();
    match action {
        StoreCommands::Stats => {
            let stats = backend.stats().await?;
            output(
                &StoreStatsResponse {
                    path: ctx.db_path.display().to_string(),
                    chunks: stats.chunks,
                    sources: stats.sources,
                    approx_bytes: stats.approx_bytes,
                },
                flags.format,
            )
        }
        StoreCommands::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every stored chunk without --yes");
            }
            let removed = backend.clear().await?;
            tracing::info!(removed, "chunk store cleared");
            output(&ClearResponse { removed }, flags.format)
        }
    }
}
