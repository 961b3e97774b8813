//! Command-line interface for `geosink`, a PostGIS dataset replication tool.
//!
//! This binary provides a thin driver around the [`geosink_core`] library:
//! it parses arguments, configures logging, establishes the database session,
//! and iterates the configured datasets one at a time. Each dataset runs the
//! full resolve → provision → load pipeline; a failed dataset is reported and
//! the batch continues.
//!
//! # Available Commands
//!
//! - `load` - Replicate the configured datasets into PostgreSQL/PostGIS
//! - `schema` - Show the resolved table schema of a local dataset

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{Level, error, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use geosink_core::pipeline::{LoadConfig, load_dataset};
use geosink_core::schema::resolve_schema;
use geosink_core::DatasetHandle;

mod config;
mod display;

use config::BatchConfig;
use display::{BatchEntry, display_batch_summary, display_resolved_schema};

#[derive(Parser)]
#[command(
    name = "geosink",
    version,
    about = "Replicate hosted geospatial datasets into PostgreSQL/PostGIS",
    long_about = "geosink loads CSV exports of hosted geospatial tables into a PostGIS\n\
                  database: it resolves each dataset's schema from a sampled read,\n\
                  provisions the destination table, and bulk loads the data in one\n\
                  transaction."
)]
/// Command-line arguments and options for the `geosink` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `geosink` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Replicates the configured datasets into the target database.
    ///
    /// Reads the batch configuration (connection parameters, destination
    /// schema, collision policy, dataset list), connects once, and loads the
    /// datasets sequentially. A summary table is printed at the end; the
    /// process exits non-zero if any dataset failed.
    Load {
        /// Path to the JSON batch configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
    },

    /// Displays the resolved table schema of a local dataset.
    ///
    /// Reads a sample of the dataset and shows the column layout and
    /// PostgreSQL types the loader would provision, without touching a
    /// database.
    Schema {
        /// Path to the local dataset file.
        #[arg(value_name = "DATASET")]
        input: PathBuf,
    },
}

/// Entry point for the `geosink` command-line interface.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true) // Show module paths for better context
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Load { config } => handle_load(&config),
        Commands::Schema { input } => {
            handle_schema(&input)?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Handles the `load` subcommand: one sequential pass over the configured
/// datasets, recording a [`BatchEntry`] per dataset.
fn handle_load(config_path: &Path) -> Result<ExitCode> {
    let batch = BatchConfig::load(config_path)?;
    let policy = batch.policy()?;

    let mut client = batch.connect()?;
    info!(
        "Connected to database '{}' on {}:{}",
        batch.database, batch.host, batch.port
    );

    let mut entries = Vec::with_capacity(batch.table_list.len());

    for name in &batch.table_list {
        let path = batch.dataset_path(name);
        info!("Loading dataset {name} from {}", path.display());

        let dataset = match DatasetHandle::open(&path) {
            Ok(dataset) => dataset,
            Err(err) => {
                error!("Skipping dataset {name}: {err}");
                entries.push(BatchEntry {
                    dataset: name.clone(),
                    outcome: None,
                    detail: err.to_string(),
                });
                continue;
            },
        };

        let load_config = LoadConfig {
            schema: batch.schema.clone(),
            table: name.clone(),
            policy,
        };

        match load_dataset(&mut client, &dataset, &load_config) {
            Ok(outcome) => {
                let detail = match &outcome {
                    geosink_core::LoadOutcome::ProvisioningFailed(err) => err.to_string(),
                    geosink_core::LoadOutcome::RolledBack(err) => err.to_string(),
                    geosink_core::LoadOutcome::Committed { .. } => String::new(),
                };
                entries.push(BatchEntry {
                    dataset: name.clone(),
                    outcome: Some(outcome),
                    detail,
                });
            },
            Err(err) => {
                error!("Dataset {name} failed: {err}");
                entries.push(BatchEntry {
                    dataset: name.clone(),
                    outcome: None,
                    detail: err.to_string(),
                });
            },
        }
    }

    display_batch_summary(&entries);

    if entries.iter().all(BatchEntry::succeeded) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Handles the `schema` subcommand by resolving and displaying a dataset's
/// column layout.
fn handle_schema(input: &Path) -> Result<()> {
    let dataset = DatasetHandle::open(input)
        .with_context(|| format!("failed to open dataset '{}'", input.display()))?;
    let resolved = resolve_schema(&dataset)?;
    display_resolved_schema(&input.display().to_string(), &resolved);
    Ok(())
}
