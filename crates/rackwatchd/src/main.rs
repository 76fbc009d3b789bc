//! rackwatchd — the Rackwatch daemon.
//!
//! Single binary that assembles the subsystems:
//! - Inventory store client (REST, credentials from env)
//! - REST API + manual sweep trigger
//! - Scheduled sweep loop (09:00 / 21:00 UTC)
//!
//! # Usage
//!
//! ```text
//! RACKWATCH_STORE_URL=https://… RACKWATCH_SERVICE_KEY=… rackwatchd serve --port 8080
//! rackwatchd sweep
//! rackwatchd migrate --input servers.json
//! ```

mod migrate;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use rackwatch_store::{InventoryStore, RestStore};
use rackwatch_sweep::TcpProber;

#[derive(Parser)]
#[command(name = "rackwatchd", about = "Rackwatch daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the API server and the scheduled sweep loop.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,
    },

    /// Run a single sweep and print its report.
    Sweep,

    /// Import a legacy single-IP `servers.json` export into the store.
    Migrate {
        /// Path to the legacy JSON file.
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rackwatch=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port } => run_serve(port).await,
        Command::Sweep => run_sweep_once().await,
        Command::Migrate { input } => run_migrate(&input).await,
    }
}

fn store_from_env() -> anyhow::Result<Arc<dyn InventoryStore>> {
    Ok(Arc::new(RestStore::from_env()?))
}

async fn run_serve(port: u16) -> anyhow::Result<()> {
    info!("rackwatch daemon starting");

    let store = store_from_env()?;
    let prober = Arc::new(TcpProber::new());
    info!("inventory store client initialized");

    // Scheduled sweep loop.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler =
        rackwatch_scheduler::SweepScheduler::new(store.clone(), prober.clone());
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));
    info!("sweep scheduler started");

    // API server.
    let (router, autosave) = rackwatch_api::build_router(store, prober);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Edits accepted with a 202 must not be lost to shutdown.
    autosave.flush_all().await;

    let _ = scheduler_handle.await;
    info!("rackwatch daemon stopped");
    Ok(())
}

async fn run_sweep_once() -> anyhow::Result<()> {
    let store = store_from_env()?;
    let prober = Arc::new(TcpProber::new());

    let report = rackwatch_sweep::run_sweep(&*store, prober).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_migrate(input: &std::path::Path) -> anyhow::Result<()> {
    let store = store_from_env()?;
    let imported = migrate::import_legacy(&*store, input).await?;
    info!(imported, "migration finished");
    Ok(())
}
