//! tgrid - drive a tablegrid model from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tablegrid::prelude::*;
use tablegrid_cli::{demo, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tgrid")]
#[command(author, version, about = "Virtual grid model playground")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the 1001x1001 demo grid and walk through merges, lookups and hiding
    Demo,

    /// Execute a grid script
    Run {
        /// Script file, one command per line
        script: PathBuf,

        /// Initial row count (the script may replace the grid with `grid R C`)
        #[arg(long, default_value = "100")]
        rows: u32,

        /// Initial column count
        #[arg(long, default_value = "26")]
        columns: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Demo => demo::run(&mut out).context("Demo failed")?,
        Commands::Run {
            script,
            rows,
            columns,
        } => run_script(&script, rows, columns, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

fn run_script<W: Write>(path: &PathBuf, rows: u32, columns: u32, out: &mut W) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    let mut session = Session::new(CellModel::new(GridOptions::with_size(rows, columns)));
    session
        .run(&source, out)
        .with_context(|| format!("Script '{}' failed", path.display()))
}
