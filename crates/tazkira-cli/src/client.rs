//! Async HTTP client wrapping the Tazkira JSON API.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tazkira_api::citizens::Verification;
use tazkira_core::{
  citizen::{CitizenRecord, Gender},
  province::Province,
  stats::RegistryStats,
};

/// Connection settings for the Tazkira API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:     String,
  pub admin_secret: String,
}

// ─── Request bodies ───────────────────────────────────────────────────────────

/// Photo payload for `POST /api/citizens`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoPayload {
  Image { media_type: String, data: String },
  Marker,
}

impl PhotoPayload {
  /// Read an image file and base64-encode it, guessing the media type from
  /// the extension.
  pub fn from_file(path: &Path) -> Result<Self> {
    let bytes = std::fs::read(path)
      .with_context(|| format!("reading photo {}", path.display()))?;
    if bytes.is_empty() {
      bail!("photo {} is empty", path.display());
    }
    Ok(Self::Image {
      media_type: media_type_for(path).to_string(),
      data:       B64.encode(bytes),
    })
  }
}

fn media_type_for(path: &Path) -> &'static str {
  let ext = path
    .extension()
    .and_then(|e| e.to_str())
    .map(str::to_ascii_lowercase);
  match ext.as_deref() {
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("png") => "image/png",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  }
}

/// JSON body for `POST /api/citizens`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
  pub full_name:        String,
  pub father_name:      String,
  pub grandfather_name: Option<String>,
  pub province:         Province,
  pub date_of_birth:    NaiveDate,
  pub gender:           Option<Gender>,
  pub photo:            PhotoPayload,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the Tazkira JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn admin(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.admin_secret.is_empty() {
      req
    } else {
      req.bearer_auth(&self.config.admin_secret)
    }
  }

  // ── Public ────────────────────────────────────────────────────────────────

  /// `POST /api/citizens`
  pub async fn register(&self, body: &RegisterRequest) -> Result<CitizenRecord> {
    let resp = self
      .client
      .post(self.url("/citizens"))
      .json(body)
      .send()
      .await
      .context("POST /citizens failed")?;
    let resp = check(resp, "POST /citizens").await?;
    resp.json().await.context("deserialising registered citizen")
  }

  /// `GET /api/citizens/<id>` — `None` when the identifier is unknown.
  pub async fn verify(&self, id: &str) -> Result<Option<Verification>> {
    let resp = self
      .client
      .get(self.url(&format!("/citizens/{id}")))
      .send()
      .await
      .context("GET /citizens/<id> failed")?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let resp = check(resp, "GET /citizens/<id>").await?;
    Ok(Some(resp.json().await.context("deserialising verification")?))
  }

  // ── Admin ─────────────────────────────────────────────────────────────────

  /// `GET /api/admin/stats`
  pub async fn stats(&self) -> Result<RegistryStats> {
    let resp = self
      .admin(self.client.get(self.url("/admin/stats")))
      .send()
      .await
      .context("GET /admin/stats failed")?;
    let resp = check(resp, "GET /admin/stats").await?;
    resp.json().await.context("deserialising stats")
  }

  /// `GET /api/admin/citizens`
  pub async fn list(&self) -> Result<Vec<CitizenRecord>> {
    let resp = self
      .admin(self.client.get(self.url("/admin/citizens")))
      .send()
      .await
      .context("GET /admin/citizens failed")?;
    let resp = check(resp, "GET /admin/citizens").await?;
    resp.json().await.context("deserialising citizens")
  }

  /// `GET /api/admin/export` — raw CSV bytes.
  pub async fn export(&self) -> Result<Vec<u8>> {
    let resp = self
      .admin(self.client.get(self.url("/admin/export")))
      .send()
      .await
      .context("GET /admin/export failed")?;
    let resp = check(resp, "GET /admin/export").await?;
    Ok(resp.bytes().await.context("reading export")?.to_vec())
  }
}

/// Turn non-2xx responses into errors carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  if status == StatusCode::UNAUTHORIZED {
    return Err(anyhow!("{what} → 401: admin secret missing or rejected"));
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_default();
  tracing::debug!(%status, %message, "request failed");
  Err(anyhow!("{what} → {status} {message}"))
}
