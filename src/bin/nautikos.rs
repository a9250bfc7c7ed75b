//! nautikos - Update container image tags across deployment manifests
//!
//! Reads `nautikos.yaml`, selects manifests by environment, repository and
//! labels, rewrites the tag of every matching image and prints what changed.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use nautikos::{Ledger, UpdaterBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nautikos", version, about)]
struct Cli {
    /// Repository whose images are updated, e.g. `registry/app`
    repository: String,

    /// Tag to set
    tag: String,

    /// Only update the manifests of this environment
    #[arg(long)]
    env: Option<String>,

    /// Only update manifests carrying all of these labels
    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,

    /// Print updated manifests instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Configuration file; manifest paths are relative to its directory
    #[arg(long, default_value = "nautikos.yaml")]
    config: PathBuf,

    /// Format of the modification report
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    // e.g., RUST_LOG=nautikos=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(0) => {
            eprintln!("error: no manifest matched the selection");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<usize, Box<dyn std::error::Error>> {
    let mut updater = UpdaterBuilder::new()
        .dry_run(cli.dry_run)
        .load(&cli.config)?;

    let examined =
        updater.update_manifests(&cli.repository, &cli.tag, cli.env.as_deref(), &cli.labels)?;
    tracing::debug!(examined, modifications = updater.ledger().len(), "Run finished");

    report(updater.ledger(), cli.format)?;
    Ok(examined)
}

fn report(ledger: &Ledger, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Text => {
            for modification in ledger {
                writeln!(out, "{}", modification)?;
            }
        }
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, ledger)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
