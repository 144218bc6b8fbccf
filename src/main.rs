// src/main.rs

//! bookwatch CLI: feed extracted records into the ingestion pipeline and
//! inspect the resulting catalogue and changelog.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use bookwatch::error::{AppError, Result};
use bookwatch::models::{Config, RawRecord};
use bookwatch::pipeline::Ingestor;
use bookwatch::services::{Catalog, ChangeView, IntakeRunner, ListFilter, SortKey};
use bookwatch::storage::LocalStore;

#[derive(Parser, Debug)]
#[command(
    name = "bookwatch",
    version,
    about = "Catalogue ingestion pipeline with change tracking"
)]
struct Cli {
    #[arg(short, long, default_value = "data/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest raw records from an NDJSON file (one record per line)
    Ingest {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print the current state of one record
    Get { id: String },
    /// List records with optional filters
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        min_rating: Option<f64>,
        /// Sort key: price, rating or reviews
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print changelog events from a recent time window
    Changes {
        #[arg(long, default_value_t = 24)]
        since_hours: i64,
    },
    /// Validate the configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);

    env_logger::Builder::new()
        .parse_filters(&config.logging.level)
        .init();

    config.validate()?;

    let store = Arc::new(LocalStore::new(&config.storage.data_dir));
    let catalog = Catalog::new(store.clone(), store.clone());

    match cli.command {
        Command::Ingest { input } => {
            let ingestor = Arc::new(Ingestor::new(
                &config,
                store.clone(),
                store.clone(),
                store.clone(),
            ));
            let runner = IntakeRunner::new(ingestor, config.pipeline.max_concurrent);
            let records = read_ndjson(&input).await?;
            log::info!("Ingesting {} record(s) from {:?}", records.len(), input);

            let stats = runner.run_batch(records).await;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "created": stats.created,
                "updated": stats.updated,
                "unchanged": stats.unchanged,
                "rejected": stats.rejected,
                "failed": stats.failed,
            }))?);
        }
        Command::Get { id } => match catalog.get(&id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => {
                log::error!("Record not found: {id}");
                std::process::exit(1);
            }
        },
        Command::List {
            category,
            min_price,
            max_price,
            min_rating,
            sort,
            offset,
            limit,
        } => {
            let sort_by = sort.as_deref().map(str::parse::<SortKey>).transpose()?;
            let filter = ListFilter {
                category,
                min_price,
                max_price,
                min_rating,
                sort_by,
                offset,
                limit: Some(limit),
            };
            let records = catalog.list(&filter).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Changes { since_hours } => {
            let events = catalog.changes_since_hours(since_hours).await?;
            let views: Vec<ChangeView> = events.iter().map(ChangeView::from).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Command::Validate => {
            let config = Config::load(&cli.config)?;
            config.validate()?;
            log::info!("Configuration OK");
            log::info!("  max_concurrent: {}", config.pipeline.max_concurrent);
            log::info!("  max_attempts: {}", config.pipeline.max_attempts);
            log::info!("  data_dir: {}", config.storage.data_dir);
            log::info!("  tracked fields: {}", config.tracking.fields.join(", "));
        }
    }

    Ok(())
}

/// Read one raw record per non-empty line.
async fn read_ndjson(path: &PathBuf) -> Result<Vec<RawRecord>> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: RawRecord = serde_json::from_str(line).map_err(|e| {
            AppError::config(format!("{path:?} line {}: {e}", number + 1))
        })?;
        records.push(record);
    }
    Ok(records)
}
