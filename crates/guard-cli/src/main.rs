use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;
mod progress;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("grd error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    let project_root = resolve_project_root(flags.project.as_deref())?;
    let config = bootstrap::load_config(&project_root)?;
    context::warn_unconfigured(&config);

    let ctx = context::AppContext::init(project_root, config)
        .await
        .context("failed to initialize guardian application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

/// `GUARDIAN_LOG` wins over the flags. Logs go to stderr so stdout stays parseable.
fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("GUARDIAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level(quiet, verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

const fn default_level(quiet: bool, verbose: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, true) => "debug",
        (false, false) => "warn",
    }
}

/// `--project` (or its `.guardian` dir) wins; otherwise the nearest ancestor
/// holding `.guardian`, else the current directory.
fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    let Some(path) = project_override.map(Path::new) else {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        return Ok(context::find_project_root(&cwd).unwrap_or(cwd));
    };

    let root = if path.file_name().is_some_and(|name| name == ".guardian") {
        path.parent()
            .context("invalid --project path: '.guardian' directory has no parent")?
    } else {
        path
    };

    if !root.is_dir() {
        anyhow::bail!("invalid --project '{}': directory does not exist", path.display());
    }
    Ok(root.to_path_buf())
}
