//! # skycache CLI
//!
//! ## Usage
//!
//! ```bash
//! skycache --config ./config/skycache.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `skycache init` | Create the SQLite database and run schema migrations |
//! | `skycache serve` | Start the background refresh tasks and the HTTP API |
//! | `skycache sync <target>` | One-shot refresh (`position`, `catalog`, `feeds`, `all`, or a feed name) |
//! | `skycache summary` | Print the dashboard summary as JSON |
//! | `skycache sources` | List feeds with interval and last fetch |
//! | `skycache stats` | Print row counts |
//!
//! Log verbosity is controlled with `LOG_LEVEL` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skycache::app::build_aggregator;
use skycache::scheduler::Scheduler;
use skycache::{config, db, ingest, migrate, server, sources, stats};

/// skycache — a polling cache for public space-data APIs.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/skycache.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "skycache",
    about = "skycache — a polling cache for public space-data APIs",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/skycache.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all tables. Idempotent.
    Init,

    /// Run the background refresh tasks and the HTTP API until Ctrl-C.
    Serve,

    /// Refresh once, outside the scheduler.
    Sync {
        /// `position`, `catalog`, `feeds`, `all`, or a single feed
        /// (`apod`, `neo`, `flr`, `cme`, `spacex`).
        target: String,
    },

    /// Print the dashboard summary assembled from the database.
    Summary,

    /// List the cached feeds with their interval and last fetch time.
    Sources,

    /// Show row counts for every table.
    Stats,
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            serve(&cfg).await?;
        }
        Commands::Sync { target } => {
            ingest::run_sync(&cfg, &target).await?;
        }
        Commands::Summary => {
            let pool = db::connect(&cfg).await?;
            let aggregator = build_aggregator(&cfg, pool.clone())?;
            let summary = aggregator.summary().await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            pool.close().await;
        }
        Commands::Sources => {
            sources::list_sources(&cfg).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}

async fn serve(cfg: &config::Config) -> Result<()> {
    let pool = db::connect(cfg).await?;
    migrate::migrate_pool(&pool)
        .await
        .context("schema setup failed")?;

    let aggregator = Arc::new(build_aggregator(cfg, pool.clone())?);
    let shutdown = CancellationToken::new();

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Ctrl-C received, shutting down");
        ctrl_c.cancel();
    });

    let scheduler = Scheduler::start(aggregator.clone(), &cfg.schedule, shutdown.clone());
    info!("started {} background tasks", scheduler.len());

    let result = server::run_server(cfg, aggregator, shutdown.clone()).await;

    shutdown.cancel();
    scheduler.shutdown().await;
    pool.close().await;
    result
}
