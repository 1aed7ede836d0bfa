//! Handlers for `/admin` endpoints. Every route requires [`AdminAccess`].
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/stats` | [`RegistryStats`] |
//! | `GET`  | `/admin/citizens` | Every record, in registration order |
//! | `GET`  | `/admin/export` | The full table as a CSV download |

use axum::{
  Json,
  extract::State,
  http::header,
  response::IntoResponse,
};
use tazkira_core::{
  citizen::CitizenRecord,
  stats::RegistryStats,
  store::RecordStore,
};

use crate::{AppState, auth::AdminAccess, error::ApiError};

/// File name offered for the export download.
pub const EXPORT_FILE_NAME: &str = "national_db.csv";

/// `GET /admin/stats`
pub async fn stats<S>(
  _: AdminAccess,
  State(state): State<AppState<S>>,
) -> Result<Json<RegistryStats>, ApiError>
where
  S: RecordStore + 'static,
{
  let stats = state.store.stats().await.map_err(ApiError::store)?;
  Ok(Json(stats))
}

/// `GET /admin/citizens`
pub async fn list<S>(
  _: AdminAccess,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<CitizenRecord>>, ApiError>
where
  S: RecordStore + 'static,
{
  let records = state.store.load().await.map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /admin/export` — `text/csv` attachment.
pub async fn export<S>(
  _: AdminAccess,
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let bytes = state.store.export().await.map_err(ApiError::store)?;
  tracing::info!(size = bytes.len(), "exported registry");
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
      ),
    ],
    bytes,
  ))
}
