//! tazkira-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus
//! `TAZKIRA_*` environment overrides, opens the CSV record store, and serves
//! the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tazkira_api::{AdminGate, AppState};
use tazkira_core::id::IdGenerator;
use tazkira_server::{DEFAULT_ADMIN_SECRET, ServerConfig};
use tazkira_store_csv::CsvStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tazkira national ID registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  if server_cfg.admin_secret == DEFAULT_ADMIN_SECRET {
    tracing::warn!("admin secret is the built-in default; set TAZKIRA_ADMIN_SECRET");
  }

  let ids = IdGenerator::new(server_cfg.id_format())
    .context("invalid identifier format in configuration")?;

  let layout = server_cfg.layout();
  let store = CsvStore::open(layout.clone())
    .await
    .with_context(|| format!("failed to open store at {:?}", layout.root))?;

  let state = AppState {
    store: Arc::new(store),
    ids,
    admin: Arc::new(AdminGate::new(server_cfg.admin_secret.clone())),
  };

  let app = tazkira_server::app(state);
  let address = server_cfg.address();

  tracing::info!(format = ?ids.format(), "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
