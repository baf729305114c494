use clap::ValueEnum;

/// How a command prints its response on stdout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON (default).
    Json,
    /// Aligned columns for humans.
    Table,
    /// Single-line JSON for pipes.
    Raw,
}

/// The flags every subcommand accepts, detached from clap.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub limit: Option<u32>,
    pub quiet: bool,
    pub verbose: bool,
    pub project: Option<String>,
}
