use std::path::PathBuf;

use clap::{ArgAction, Parser};
use dbmerge_core::{MergeConfig, Summary};
use dbmerge_engine::ConsolidationEngine;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "dbmerge", version)]
#[command(about = "Consolidate the tables of many SQLite databases into one")]
struct Cli {
    /// Files or directories to search for databases (default: current directory).
    sources: Vec<PathBuf>,
    /// Database that receives every table; created if absent (default: ./result.db).
    #[arg(short, long)]
    destination: Option<PathBuf>,
    /// Extension identifying a database file. Repeatable (default: db, sqlite).
    #[arg(short, long = "extension", action = ArgAction::Append)]
    extensions: Vec<String>,
    /// Only transfer this table. Repeatable (default: all tables).
    #[arg(short, long = "table", action = ArgAction::Append)]
    tables: Vec<String>,
    /// Number of sources transferred in parallel (default: number of CPUs).
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Maximum bind parameters per INSERT statement.
    #[arg(long)]
    max_params: Option<usize>,
    /// YAML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the run summary as JSON instead of text.
    #[arg(long)]
    json: bool,
    /// Log per-table and per-batch detail.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    let json = cli.json;
    let config = build_config(cli)?;

    let engine = ConsolidationEngine::new(config).map_err(|err| err.to_string())?;
    let summary = engine.run().map_err(|err| err.to_string())?;

    if json {
        let raw = serde_json::to_string_pretty(&summary)
            .map_err(|err| format!("Failed to serialize summary: {err}"))?;
        println!("{raw}");
    } else {
        print_summary(&summary);
    }

    Ok(())
}

/// Layers command-line flags over the config file (or the defaults).
fn build_config(cli: Cli) -> Result<MergeConfig, String> {
    let mut config = match &cli.config {
        Some(path) => MergeConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => MergeConfig::default(),
    };

    if !cli.sources.is_empty() {
        config.sources = cli.sources;
    }
    if let Some(destination) = cli.destination {
        config.destination = destination;
    }
    if !cli.extensions.is_empty() {
        config.extensions = cli.extensions;
    }
    if !cli.tables.is_empty() {
        config.tables = cli.tables;
    }
    if cli.jobs.is_some() {
        config.jobs = cli.jobs;
    }
    if let Some(max_params) = cli.max_params {
        config.max_bind_parameters = max_params;
    }

    Ok(config)
}

fn print_summary(summary: &Summary) {
    println!("{}", summary.destination.display());
    println!(
        "Copied {} tables from {} databases in {:.3} seconds.",
        summary.tables_copied, summary.databases_found, summary.elapsed_seconds
    );
    if summary.tables_failed > 0 {
        println!("{} tables failed.", summary.tables_failed);
    }
}
