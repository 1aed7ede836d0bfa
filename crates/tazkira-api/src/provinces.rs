//! Handler for `GET /provinces`.

use axum::Json;
use serde::{Deserialize, Serialize};
use tazkira_core::province::Province;

/// A selectable province and the code it contributes to identifiers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProvinceInfo {
  pub name: Province,
  pub code: u8,
}

/// `GET /provinces`
pub async fn list() -> Json<Vec<ProvinceInfo>> {
  Json(
    Province::all()
      .map(|name| ProvinceInfo { name, code: name.code() })
      .collect(),
  )
}
