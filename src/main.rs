use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use pressbox::api::{self, AppState};
use pressbox::config::Config;
use pressbox::ingest::fetcher;
use pressbox::ingest::scrape::ScraperRegistry;
use pressbox::scheduler;
use pressbox::storage::{Database, DatabaseError};

#[derive(Parser, Debug)]
#[command(
    name = "pressbox",
    version,
    about = "Press-release feed aggregation service"
)]
struct Args {
    /// Path to the configuration file
    #[arg(long, value_name = "FILE", default_value = "pressbox.toml")]
    config: PathBuf,

    /// Listen address, overriding the config file (e.g. 0.0.0.0:8000)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Database file path, overriding the config file
    #[arg(long, value_name = "FILE")]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Default to info-level logs unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config).context("Failed to load configuration")?;
    let bind_addr = args.bind.unwrap_or_else(|| config.bind_addr.clone());
    let database_path = args
        .database
        .unwrap_or_else(|| config.database_path.clone());

    // Open database
    let db = match Database::open(&database_path).await {
        Ok(db) => db,
        Err(e @ DatabaseError::InstanceLocked) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let client = fetcher::build_client().context("Failed to build HTTP client")?;
    let scrapers = Arc::new(ScraperRegistry::with_builtin_sites());

    // Background refresh loop; returns immediately when disabled
    tokio::spawn(scheduler::run(
        db.clone(),
        client.clone(),
        scrapers.clone(),
        config.refresh_interval_minutes,
    ));

    let state = AppState {
        db,
        client,
        scrapers,
    };
    api::serve(state, &bind_addr).await
}
