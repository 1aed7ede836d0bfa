//! Provinces and their two-digit codes.
//!
//! The province code embedded in provincial identifiers is derived from the
//! province name by a fixed hash, so the same name always yields the same
//! code regardless of process, platform, or build.

use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator as _};

use crate::{Error, Result};

/// The 34 provinces accepted at registration.
///
/// `Display` and `FromStr` use the conventional English spelling; parsing is
/// ASCII case-insensitive.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Province {
  Badakhshan,
  Badghis,
  Baghlan,
  Balkh,
  Bamyan,
  Daykundi,
  Farah,
  Faryab,
  Ghazni,
  Ghor,
  Helmand,
  Herat,
  Jowzjan,
  Kabul,
  Kandahar,
  Kapisa,
  Khost,
  Kunar,
  Kunduz,
  Laghman,
  Logar,
  Nangarhar,
  Nimruz,
  Nuristan,
  Paktia,
  Paktika,
  Panjshir,
  Parwan,
  Samangan,
  #[serde(rename = "Sar-e Pol")]
  #[strum(serialize = "Sar-e Pol")]
  SarePol,
  Takhar,
  Uruzgan,
  Wardak,
  Zabul,
}

impl Province {
  /// Parse a province name, mapping failure to [`Error::UnknownProvince`].
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name.trim())
      .map_err(|_| Error::UnknownProvince(name.to_owned()))
  }

  /// All provinces in alphabetical order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// The two-digit code (1–99) embedded in provincial identifiers.
  pub fn code(self) -> u8 { province_code(self.as_ref()) }
}

/// Stable province code for an arbitrary name.
///
/// The first eight bytes of SHA-256 over the UTF-8 name are read as a
/// big-endian `u64`, reduced modulo 99 and offset by one. Distinct names may
/// share a code.
pub fn province_code(name: &str) -> u8 {
  let digest = Sha256::digest(name.as_bytes());
  let mut head = [0u8; 8];
  head.copy_from_slice(&digest[..8]);
  (u64::from_be_bytes(head) % 99 + 1) as u8
}
