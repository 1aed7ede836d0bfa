//! Citizen records — the single row type of the registry.
//!
//! A record is written once at registration and never updated or deleted.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{id::IdFormat, province::Province};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A minted national identifier.
///
/// Not guaranteed globally unique; see [`crate::id::IdGenerator`].
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Whether the identifier has the shape produced by `format`.
  ///
  /// Provincial: `PP-YYYY-R…` with a province code in 01–99, a four-digit
  /// year, and a suffix of exactly `suffix_digits` digits without a leading
  /// zero. Numeric: twelve ASCII digits.
  pub fn matches_format(&self, format: IdFormat) -> bool {
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match format {
      IdFormat::Numeric => {
        self.0.len() == crate::id::NUMERIC_ID_DIGITS && all_digits(&self.0)
      }
      IdFormat::Provincial { suffix_digits } => {
        let mut parts = self.0.split('-');
        let (Some(code), Some(year), Some(suffix), None) =
          (parts.next(), parts.next(), parts.next(), parts.next())
        else {
          return false;
        };
        code.len() == 2
          && all_digits(code)
          && code != "00"
          && year.len() == 4
          && all_digits(year)
          && !year.starts_with('0')
          && suffix.len() == suffix_digits as usize
          && all_digits(suffix)
          && !suffix.starts_with('0')
      }
    }
  }
}

impl fmt::Display for NationalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for NationalId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl From<String> for NationalId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for NationalId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
  Male,
  Female,
}

// ─── Photo ───────────────────────────────────────────────────────────────────

/// Placeholder stored when a photo was captured but its bytes are not kept.
pub const DEFAULT_PHOTO_MARKER: &str = "biometric_data_secured";

/// Where a citizen's photo lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoRef {
  /// An opaque marker; no image bytes are held by the store.
  Marker { label: String },
  /// Image bytes on disk, owned by the store.
  File {
    /// Path relative to the store's data directory.
    path:         String,
    /// SHA-256 hex digest of the image bytes.
    content_hash: String,
  },
}

impl PhotoRef {
  pub fn marker() -> Self {
    Self::Marker { label: DEFAULT_PHOTO_MARKER.to_owned() }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One registrant, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenRecord {
  pub national_id:      NationalId,
  pub full_name:        String,
  pub father_name:      String,
  pub grandfather_name: Option<String>,
  pub province:         Province,
  pub date_of_birth:    NaiveDate,
  pub gender:           Option<Gender>,
  pub photo:            PhotoRef,
  /// Set once at creation; never changes.
  pub registered_at:    DateTime<Utc>,
}

/// Registration input collected by the caller.
///
/// The identifier, photo reference, and timestamp are assigned during
/// registration and are not accepted from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCitizen {
  pub full_name:        String,
  pub father_name:      String,
  #[serde(default)]
  pub grandfather_name: Option<String>,
  pub province:         Province,
  pub date_of_birth:    NaiveDate,
  #[serde(default)]
  pub gender:           Option<Gender>,
}

impl NewCitizen {
  /// Build the persisted record, stamping `registered_at` with the current
  /// time.
  pub fn into_record(
    self,
    national_id: NationalId,
    photo: PhotoRef,
  ) -> CitizenRecord {
    CitizenRecord {
      national_id,
      full_name: self.full_name,
      father_name: self.father_name,
      grandfather_name: self.grandfather_name,
      province: self.province,
      date_of_birth: self.date_of_birth,
      gender: self.gender,
      photo,
      registered_at: Utc::now(),
    }
  }
}
