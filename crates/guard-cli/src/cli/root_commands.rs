use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use guard_core::enums::AuditMode;

use crate::cli::subcommands::StoreCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Ingest regulatory documents into the chunk store.
    Ingest(IngestArgs),
    /// Retrieve the stored chunks nearest to a question.
    Query(QueryArgs),
    /// Chunk store maintenance.
    Store {
        #[command(subcommand)]
        action: StoreCommands,
    },
    /// Derive a compliance brief from the stored regulation.
    Brief(BriefArgs),
    /// Audit a repository against a compliance brief.
    Audit(AuditArgs),
    /// Recorded audit runs.
    History(HistoryArgs),
}

#[derive(Clone, Debug, Args)]
pub struct IngestArgs {
    /// UTF-8 text or markdown files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Source document id. Defaults to the file name; only valid with one path.
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct QueryArgs {
    /// Free-text question.
    pub text: String,

    /// Number of chunks to return (overrides --limit and store.query_k).
    #[arg(short, long)]
    pub k: Option<u32>,

    /// Prefer chunks from this source document.
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct BriefArgs {
    /// The compliance question to answer from stored regulation.
    pub question: String,

    /// Context chunks to retrieve (defaults to store.query_k).
    #[arg(short, long)]
    pub k: Option<u32>,

    /// Prefer chunks from this source document.
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Repository URL or local directory.
    pub repository: String,

    /// File with one requirement per line ("- " bullets are accepted).
    #[arg(long, conflicts_with_all = ["requirement", "question"])]
    pub brief_file: Option<PathBuf>,

    /// A requirement statement. Repeat for several.
    #[arg(short, long)]
    pub requirement: Vec<String>,

    /// Derive the brief from the chunk store by asking this question.
    #[arg(long, conflicts_with = "requirement")]
    pub question: Option<String>,

    /// Prefer this source document when deriving the brief.
    #[arg(long, requires = "question")]
    pub source: Option<String>,

    /// File selection: `hybrid` (patterns, then discovery) or `full` (every file).
    #[arg(long, value_enum, default_value = "hybrid")]
    pub mode: ModeArg,

    /// Select files from brief keywords only, without model hints.
    #[arg(long)]
    pub no_hints: bool,

    /// Clone with full history instead of a shallow clone.
    #[arg(long)]
    pub full_history: bool,

    /// Concurrent classifier calls (overrides scan.workers).
    #[arg(long)]
    pub workers: Option<usize>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    Hybrid,
    Full,
}

impl From<ModeArg> for AuditMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Hybrid => Self::Hybrid,
            ModeArg::Full => Self::Full,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    /// Show the merged violations of one run instead of the run list.
    #[arg(long)]
    pub run: Option<String>,
}
