use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// `grd`: ingest regulations, derive briefs, audit repositories.
#[derive(Debug, Parser)]
#[command(name = "grd", version, about = "Guardian - regulatory compliance audits for code")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// How results are printed (json, table or raw)
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Cap on returned rows; `query` and `brief` also use it as k
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding `.guardian/` (searched upwards from cwd when absent)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Flags every handler sees, detached from the subcommand.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}
