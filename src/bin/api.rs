//! Diary API Server
//!
//! Run with: cargo run --bin diary-api
//!
//! # Configuration
//!
//! Read from the first config file found (`~/.config/diary/config.toml`,
//! `/etc/diary/config.toml`, `./config.toml`), or from the path given as
//! the only argument. Environment variables override the file:
//! - `DIARY_API_HOST`: Host to bind to (default: 127.0.0.1)
//! - `DIARY_API_PORT`: Port to listen on (default: 8090)
//! - `DIARY_DATA_DIR`: Data directory
//! - `DIARY_STORAGE_BACKEND`: memory, sqlite or log (default: sqlite)
//! - `DIARY_INSIGHTS_URL`: Insight service URL (optional, local rules otherwise)
//! - `DIARY_LOG_LEVEL`, `DIARY_LOG_FORMAT`: Logging (or `RUST_LOG`)

use anyhow::Context;
use diary::api::{serve, AppState};
use diary::{logging, Config, Journal};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Config::load_with_env(&path)?,
        None => Config::load_default(),
    };

    logging::init(&config.logging).context("initializing logging")?;

    tracing::info!("Starting Diary API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        backend = ?config.storage.backend,
        data_dir = %config.storage.data_path().display(),
        "Storage configured"
    );

    let journal = Arc::new(Journal::open(&config).context("opening journal")?);
    tracing::info!(
        entries = journal.count().unwrap_or(0),
        "Journal ready"
    );

    match &config.insights.url {
        Some(url) => tracing::info!("Insight service enabled: {}", url),
        None => tracing::info!("Insight service disabled (set DIARY_INSIGHTS_URL to enable)"),
    }

    let state = AppState::new(journal, config.api.clone());
    serve(state).await?;

    tracing::info!("Diary API server stopped");
    Ok(())
}
