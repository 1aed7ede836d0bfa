//! JSON REST API for Tazkira.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tazkira_core::store::RecordStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tazkira_api::api_router(state))
//! ```

pub mod admin;
pub mod auth;
pub mod citizens;
pub mod error;
pub mod provinces;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use tazkira_core::{id::IdGenerator, store::RecordStore};

pub use auth::AdminGate;
pub use error::ApiError;

/// Upper bound on request bodies; photos arrive base64-encoded inline.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub ids:   IdGenerator,
  pub admin: Arc<AdminGate>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      ids:   self.ids,
      admin: Arc::clone(&self.admin),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Public
    .route("/citizens", post(citizens::register::<S>))
    .route("/citizens/{id}", get(citizens::verify::<S>))
    .route("/provinces", get(provinces::list))
    // Admin
    .route("/admin/stats", get(admin::stats::<S>))
    .route("/admin/citizens", get(admin::list::<S>))
    .route("/admin/export", get(admin::export::<S>))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use serde_json::{Value, json};
  use tazkira_core::{citizen::CitizenRecord, id::IdFormat};
  use tazkira_store_csv::{CsvStore, StoreLayout};
  use tempfile::TempDir;
  use tower::ServiceExt as _;

  async fn make_state() -> (TempDir, AppState<CsvStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::open(StoreLayout::new(dir.path())).await.unwrap();
    let state = AppState {
      store: Arc::new(store),
      ids:   IdGenerator::default(),
      admin: Arc::new(AdminGate::new("admin123")),
    };
    (dir, state)
  }

  async fn send(
    state: AppState<CsvStore>,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    api_router(state).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn registration(province: &str) -> Value {
    json!({
      "full_name": "Ahmad Shah",
      "father_name": "Mohammad",
      "grandfather_name": "Abdullah",
      "province": province,
      "date_of_birth": "1990-03-21",
      "gender": "male",
      "photo": { "kind": "image", "media_type": "image/jpeg", "data": B64.encode(b"fake-jpeg") }
    })
  }

  // ── Registration ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_mints_id_and_stores_photo() {
    let (dir, state) = make_state().await;
    let resp = send(state.clone(), "POST", "/citizens", None, Some(registration("Kabul"))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let record: CitizenRecord = serde_json::from_value(json_body(resp).await).unwrap();
    assert!(record.national_id.matches_format(IdFormat::default()), "{}", record.national_id);
    assert!(record.national_id.as_str().starts_with("43-1990-"));
    assert_eq!(record.grandfather_name.as_deref(), Some("Abdullah"));

    let photo_path = state.store.layout().resolve(&record.photo).unwrap();
    assert!(photo_path.starts_with(dir.path()));
    assert_eq!(std::fs::read(photo_path).unwrap(), b"fake-jpeg");

    assert_eq!(state.store.load().await.unwrap(), vec![record]);
  }

  #[tokio::test]
  async fn register_with_marker_photo() {
    let (_dir, state) = make_state().await;
    let mut body = registration("Herat");
    body["photo"] = json!({ "kind": "marker" });
    let resp = send(state, "POST", "/citizens", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let value = json_body(resp).await;
    assert_eq!(value["photo"]["kind"], "marker");
    assert_eq!(value["photo"]["label"], "biometric_data_secured");
  }

  #[tokio::test]
  async fn register_without_photo_is_rejected() {
    let (_dir, state) = make_state().await;
    let mut body = registration("Kabul");
    body.as_object_mut().unwrap().remove("photo");
    let resp = send(state.clone(), "POST", "/citizens", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(resp).await["error"].as_str().unwrap().contains("photo"));
    assert!(state.store.load().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn register_with_blank_name_is_rejected() {
    let (_dir, state) = make_state().await;
    let mut body = registration("Kabul");
    body["full_name"] = json!("   ");
    let resp = send(state, "POST", "/citizens", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn register_with_bad_base64_is_rejected() {
    let (_dir, state) = make_state().await;
    let mut body = registration("Kabul");
    body["photo"]["data"] = json!("!!!not-base64!!!");
    let resp = send(state, "POST", "/citizens", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn register_with_unknown_province_is_rejected() {
    let (_dir, state) = make_state().await;
    let resp = send(state, "POST", "/citizens", None, Some(registration("Atlantis"))).await;
    assert!(resp.status().is_client_error());
  }

  #[tokio::test]
  async fn failed_append_discards_photo() {
    let (dir, state) = make_state().await;
    std::fs::write(state.store.layout().db_path(), "not,the,canonical,header\n").unwrap();

    let resp = send(state.clone(), "POST", "/citizens", None, Some(registration("Kabul"))).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let photo_dir = dir.path().join(tazkira_store_csv::DEFAULT_PHOTO_DIR);
    let leftovers = std::fs::read_dir(&photo_dir).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftovers, 0);
  }

  #[tokio::test]
  async fn numeric_ids_when_configured() {
    let (_dir, mut state) = make_state().await;
    state.ids = IdGenerator::new(IdFormat::Numeric).unwrap();
    let resp = send(state, "POST", "/citizens", None, Some(registration("Balkh"))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let value = json_body(resp).await;
    let id = value["national_id"].as_str().unwrap();
    assert_eq!(id.len(), 12);
    assert!(id.bytes().all(|b| b.is_ascii_digit()));
  }

  // ── Verification ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn verify_registered_citizen() {
    let (_dir, state) = make_state().await;
    let resp = send(state.clone(), "POST", "/citizens", None, Some(registration("Kabul"))).await;
    let id = json_body(resp).await["national_id"].as_str().unwrap().to_string();

    let resp = send(state, "GET", &format!("/citizens/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let value = json_body(resp).await;
    assert_eq!(value["national_id"], id.as_str());
    assert_eq!(value["full_name"], "Ahmad Shah");
    assert_eq!(value["province"], "Kabul");
    assert_eq!(value["status"], "active");
  }

  #[tokio::test]
  async fn verify_unknown_id_is_404() {
    let (_dir, state) = make_state().await;
    let resp = send(state, "GET", "/citizens/99-9999-999999", None, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Admin ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_routes_require_secret() {
    let (_dir, state) = make_state().await;
    for uri in ["/admin/stats", "/admin/citizens", "/admin/export"] {
      let resp = send(state.clone(), "GET", uri, None, None).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
      assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

      let resp = send(state.clone(), "GET", uri, Some("wrong"), None).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
  }

  #[tokio::test]
  async fn admin_stats_and_list() {
    let (_dir, state) = make_state().await;
    for p in ["Kabul", "Herat", "Kabul"] {
      let resp = send(state.clone(), "POST", "/citizens", None, Some(registration(p))).await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = send(state.clone(), "GET", "/admin/stats", Some("admin123"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = json_body(resp).await;
    assert_eq!(stats["total_count"], 3);
    assert_eq!(stats["distinct_province_count"], 2);
    assert_eq!(stats["by_province"]["Kabul"], 2);

    let resp = send(state, "GET", "/admin/citizens", Some("admin123"), None).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn admin_export_is_csv_attachment() {
    let (_dir, state) = make_state().await;
    send(state.clone(), "POST", "/citizens", None, Some(registration("Kabul"))).await;

    let resp = send(state, "GET", "/admin/export", Some("admin123"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/csv"), "Content-Type: {ct}");
    let cd = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(cd.contains("national_db.csv"), "Content-Disposition: {cd}");

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.starts_with("national_id,full_name,"), "{text}");
    assert_eq!(text.lines().count(), 2);
  }

  // ── Provinces ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn provinces_are_listed_with_codes() {
    let (_dir, state) = make_state().await;
    let resp = send(state, "GET", "/provinces", None, None).await;
    let value = json_body(resp).await;
    let list = value.as_array().unwrap();
    assert_eq!(list.len(), 34);
    assert!(list.iter().any(|p| p["name"] == "Kabul" && p["code"] == 43));
  }
}
