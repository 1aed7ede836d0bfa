//! Server wiring for Tazkira: configuration, store layout, and the top-level
//! HTTP router.

use std::path::{Path, PathBuf};

use axum::Router;
use serde::Deserialize;
use tazkira_api::{AppState, api_router};
use tazkira_core::{id::IdFormat, store::RecordStore};
use tazkira_store_csv::{DEFAULT_DB_FILE, DEFAULT_PHOTO_DIR, StoreLayout};
use tower_http::trace::TraceLayer;

/// Admin secret used when none is configured.
pub const DEFAULT_ADMIN_SECRET: &str = "admin123";

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "TAZKIRA";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which identifier format to mint.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdFormatName {
  Provincial,
  Numeric,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `TAZKIRA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  /// Data directory; a leading `~/` is expanded.
  pub data_dir:         PathBuf,
  /// Record table, relative to `data_dir`.
  pub db_file:          PathBuf,
  /// Photo directory, relative to `data_dir`.
  pub photo_dir:        PathBuf,
  pub admin_secret:     String,
  pub id_format:        IdFormatName,
  /// Suffix width for provincial identifiers (5 or 6).
  pub id_suffix_digits: u32,
}

impl ServerConfig {
  /// Read `path` if it exists, then apply environment overrides on top of
  /// the defaults.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("data_dir", "data")?
      .set_default("db_file", DEFAULT_DB_FILE)?
      .set_default("photo_dir", DEFAULT_PHOTO_DIR)?
      .set_default("admin_secret", DEFAULT_ADMIN_SECRET)?
      .set_default("id_format", "provincial")?
      .set_default("id_suffix_digits", 6)?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn id_format(&self) -> IdFormat {
    match self.id_format {
      IdFormatName::Provincial => {
        IdFormat::Provincial { suffix_digits: self.id_suffix_digits }
      }
      IdFormatName::Numeric => IdFormat::Numeric,
    }
  }

  pub fn layout(&self) -> StoreLayout {
    StoreLayout {
      root:      expand_tilde(&self.data_dir),
      db_file:   self.db_file.clone(),
      photo_dir: self.photo_dir.clone(),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The complete application: the JSON API under `/api`, with request
/// tracing.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: RecordStore + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}
