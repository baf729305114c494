use clap::Subcommand;

/// Regulatory chunk store maintenance.
#[derive(Clone, Debug, Subcommand)]
pub enum StoreCommands {
    /// Show chunk and source counts.
    Stats,
    /// Delete every stored chunk.
    Clear {
        /// Confirm the irreversible delete.
        #[arg(long)]
        yes: bool,
    },
}
