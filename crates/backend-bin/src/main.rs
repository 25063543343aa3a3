// ============================
// crates/backend-bin/src/main.rs
// ============================
//! Flow Todo API server binary.

use clap::Parser;
use flowtodo_backend::{api, config::Settings, store::MemoryStore, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowtodo-server", about = "Flow Todo API server")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize configuration
    let settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&settings.log_level))?,
        )
        .init();

    // Create storage and application state
    let storage = MemoryStore::new();
    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::new(storage, settings));

    let app = api::create_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
