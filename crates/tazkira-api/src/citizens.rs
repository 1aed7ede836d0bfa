//! Handlers for `/citizens` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/citizens` | Body: [`RegisterBody`]; returns 201 + stored record |
//! | `GET`  | `/citizens/:id` | [`Verification`]; 404 if the identifier is unknown |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::{Datelike as _, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tazkira_core::{
  citizen::{Gender, NationalId, NewCitizen, PhotoRef},
  province::Province,
  store::RecordStore,
};

use crate::{AppState, error::ApiError};

/// Earliest accepted date of birth.
pub fn min_birth_date() -> NaiveDate {
  NaiveDate::from_ymd_opt(1920, 1, 1).unwrap_or(NaiveDate::MIN)
}

// ─── Register ────────────────────────────────────────────────────────────────

/// A captured photo as sent by the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoUpload {
  /// Raw image bytes, base64-encoded.
  Image { media_type: String, data: String },
  /// The photo was taken but only a marker is kept.
  Marker,
}

/// JSON body accepted by `POST /citizens`.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub full_name:        String,
  pub father_name:      String,
  pub grandfather_name: Option<String>,
  pub province:         Province,
  pub date_of_birth:    NaiveDate,
  pub gender:           Option<Gender>,
  pub photo:            Option<PhotoUpload>,
}

/// A photo that passed validation.
#[derive(Debug)]
enum Photo {
  Image { media_type: String, bytes: Vec<u8> },
  Marker,
}

impl RegisterBody {
  /// Presence and range checks. The store never re-validates.
  fn validate(self, today: NaiveDate) -> Result<(NewCitizen, Photo), ApiError> {
    let non_empty = |field: &str, value: String| {
      let value = value.trim().to_owned();
      if value.is_empty() {
        Err(ApiError::Validation(format!("{field} is required")))
      } else {
        Ok(value)
      }
    };

    let full_name = non_empty("full_name", self.full_name)?;
    let father_name = non_empty("father_name", self.father_name)?;
    let grandfather_name = self
      .grandfather_name
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty());

    let earliest = min_birth_date();
    if self.date_of_birth < earliest || self.date_of_birth > today {
      return Err(ApiError::Validation(format!(
        "date_of_birth must be between {earliest} and {today}"
      )));
    }

    let photo = match self.photo {
      None => return Err(ApiError::Validation("photo is required".into())),
      Some(PhotoUpload::Marker) => Photo::Marker,
      Some(PhotoUpload::Image { media_type, data }) => {
        let bytes = B64.decode(data.trim()).map_err(|e| {
          ApiError::Validation(format!("photo data is not valid base64: {e}"))
        })?;
        if bytes.is_empty() {
          return Err(ApiError::Validation("photo is empty".into()));
        }
        Photo::Image { media_type, bytes }
      }
    };

    let citizen = NewCitizen {
      full_name,
      father_name,
      grandfather_name,
      province: self.province,
      date_of_birth: self.date_of_birth,
      gender: self.gender,
    };
    Ok((citizen, photo))
  }
}

/// `POST /citizens` — mint an identifier, store the photo, then append the
/// record. Returns 201 + the stored
/// [`CitizenRecord`](tazkira_core::citizen::CitizenRecord).
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let (citizen, photo) = body.validate(Utc::now().date_naive())?;

  let national_id = state
    .ids
    .generate(citizen.province, citizen.date_of_birth.year())
    .map_err(|e| ApiError::Validation(e.to_string()))?;

  // Image bytes must be durable before a record points at them.
  let photo = match photo {
    Photo::Image { media_type, bytes } => state
      .store
      .store_photo(&national_id, bytes, &media_type)
      .await
      .map_err(ApiError::store)?,
    Photo::Marker => PhotoRef::marker(),
  };

  let record = match state
    .store
    .append(citizen.into_record(national_id, photo.clone()))
    .await
  {
    Ok(record) => record,
    Err(e) => {
      // No record points at the photo; don't leave it behind.
      if let Err(discard) = state.store.discard_photo(&photo).await {
        tracing::warn!(?photo, error = %discard, "orphaned photo after failed append");
      }
      return Err(ApiError::store(e));
    }
  };

  tracing::info!(
    national_id = %record.national_id,
    province = %record.province,
    "registered citizen"
  );
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Verify ──────────────────────────────────────────────────────────────────

/// The public view of a verified identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct Verification {
  pub national_id: NationalId,
  pub full_name:   String,
  pub father_name: String,
  pub province:    Province,
  /// Always `"active"`; records are never revoked.
  pub status:      String,
}

/// `GET /citizens/:id`
pub async fn verify<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Verification>, ApiError>
where
  S: RecordStore + 'static,
{
  let record = state
    .store
    .find_by_identifier(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("national id {id} not found")))?;

  Ok(Json(Verification {
    national_id: record.national_id,
    full_name:   record.full_name,
    father_name: record.father_name,
    province:    record.province,
    status:      "active".to_string(),
  }))
}
