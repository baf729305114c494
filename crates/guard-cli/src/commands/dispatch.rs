use crate::cli::{Commands, GlobalFlags};
use crate::commands;
use crate::context::AppContext;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Ingest(args) => commands::ingest::handle(&args, ctx, flags).await,
        Commands::Query(args) => commands::query::handle(&args, ctx, flags).await,
        Commands::Store { action } => commands::store::handle(&action, ctx, flags).await,
        Commands::Brief(args) => commands::brief::handle(&args, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::History(args) => commands::history::handle(&args, ctx, flags).await,
    }
}
