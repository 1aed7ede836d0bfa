//! Admin gate: a bearer-token extractor and standalone verifier.
//!
//! The token is a single shared secret compared for plain string equality.
//! It keeps casual visitors out of the admin routes and nothing more.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use tazkira_core::store::RecordStore;

use crate::{AppState, error::ApiError};

/// The shared secret accepted for admin routes.
#[derive(Clone)]
pub struct AdminGate {
  secret: String,
}

impl AdminGate {
  pub fn new(secret: impl Into<String>) -> Self {
    Self { secret: secret.into() }
  }

  /// Check `Authorization: Bearer <secret>` in `headers`.
  pub fn verify(&self, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .ok_or(ApiError::Unauthorized)?;

    if self.secret.is_empty() || token != self.secret {
      tracing::warn!("rejected admin request");
      return Err(ApiError::Unauthorized);
    }
    Ok(())
  }
}

/// Zero-size marker: present in the handler means the request passed the
/// admin gate.
pub struct AdminAccess;

impl<S> FromRequestParts<AppState<S>> for AdminAccess
where
  S: RecordStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    state.admin.verify(&parts.headers)?;
    Ok(AdminAccess)
  }
}
