//! Encoding and decoding between [`CitizenRecord`] and CSV rows.
//!
//! Every column is read as a plain string into [`RawRow`] first; turning a
//! raw row into a record is where malformed data is detected and reported
//! as [`Error::CorruptRecord`] with the offending line number.

use std::{
  fs::File,
  io::{self, Read},
  path::Path,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tazkira_core::{
  citizen::{CitizenRecord, Gender, NationalId, PhotoRef},
  province::Province,
};

use crate::{
  Error, Result,
  schema::{COLUMNS, DATE_FORMAT, PHOTO_KIND_FILE, PHOTO_KIND_MARKER},
};

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings of one CSV row. Field order matches [`COLUMNS`].
#[derive(Debug, Serialize, Deserialize)]
pub struct RawRow {
  pub national_id:      String,
  pub full_name:        String,
  pub father_name:      String,
  pub grandfather_name: String,
  pub province:         String,
  pub date_of_birth:    String,
  pub gender:           String,
  pub photo_kind:       String,
  pub photo_ref:        String,
  pub photo_sha256:     String,
  pub registered_at:    String,
}

impl From<&CitizenRecord> for RawRow {
  fn from(r: &CitizenRecord) -> Self {
    let (photo_kind, photo_ref, photo_sha256) = match &r.photo {
      PhotoRef::Marker { label } => {
        (PHOTO_KIND_MARKER, label.clone(), String::new())
      }
      PhotoRef::File { path, content_hash } => {
        (PHOTO_KIND_FILE, path.clone(), content_hash.clone())
      }
    };
    Self {
      national_id:      r.national_id.to_string(),
      full_name:        r.full_name.clone(),
      father_name:      r.father_name.clone(),
      grandfather_name: r.grandfather_name.clone().unwrap_or_default(),
      province:         r.province.to_string(),
      date_of_birth:    r.date_of_birth.format(DATE_FORMAT).to_string(),
      gender:           r.gender.map(|g| g.to_string()).unwrap_or_default(),
      photo_kind:       photo_kind.to_owned(),
      photo_ref,
      photo_sha256,
      registered_at:    r.registered_at.to_rfc3339(),
    }
  }
}

impl RawRow {
  pub fn into_record(self, line: u64) -> Result<CitizenRecord> {
    let required = |name: &str, value: String| {
      if value.trim().is_empty() {
        Err(Error::corrupt(line, format!("missing required field `{name}`")))
      } else {
        Ok(value)
      }
    };

    let national_id = NationalId::new(required("national_id", self.national_id)?);
    let full_name = required("full_name", self.full_name)?;
    let father_name = required("father_name", self.father_name)?;
    let grandfather_name =
      Some(self.grandfather_name).filter(|s| !s.trim().is_empty());

    let province = Province::parse(&self.province)
      .map_err(|e| Error::corrupt(line, e.to_string()))?;

    let date_of_birth =
      NaiveDate::parse_from_str(&self.date_of_birth, DATE_FORMAT).map_err(
        |e| Error::corrupt(line, format!("bad date_of_birth {:?}: {e}", self.date_of_birth)),
      )?;

    let gender = match self.gender.trim() {
      "" => None,
      g => Some(g.parse::<Gender>().map_err(|_| {
        Error::corrupt(line, format!("unknown gender {g:?}"))
      })?),
    };

    let photo = match self.photo_kind.as_str() {
      PHOTO_KIND_MARKER => PhotoRef::Marker {
        label: required("photo_ref", self.photo_ref)?,
      },
      PHOTO_KIND_FILE => {
        let path = required("photo_ref", self.photo_ref)?;
        let content_hash = self.photo_sha256;
        if content_hash.len() != 64
          || !content_hash.bytes().all(|b| b.is_ascii_hexdigit())
        {
          return Err(Error::corrupt(
            line,
            format!("bad photo_sha256 {content_hash:?}"),
          ));
        }
        PhotoRef::File { path, content_hash }
      }
      other => {
        return Err(Error::corrupt(line, format!("unknown photo_kind {other:?}")));
      }
    };

    let registered_at = DateTime::parse_from_rfc3339(&self.registered_at)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|e| {
        Error::corrupt(line, format!("bad registered_at {:?}: {e}", self.registered_at))
      })?;

    Ok(CitizenRecord {
      national_id,
      full_name,
      father_name,
      grandfather_name,
      province,
      date_of_birth,
      gender,
      photo,
      registered_at,
    })
  }
}

// ─── Reading ─────────────────────────────────────────────────────────────────

/// Read every record from `path`. A missing file is an empty collection.
pub fn read_records(path: &Path) -> Result<Vec<CitizenRecord>> {
  let file = match File::open(path) {
    Ok(f) => f,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => return Err(Error::storage(path, e)),
  };
  decode_records(file, path)
}

/// Decode a whole table. `path` is only used to label I/O errors.
pub fn decode_records<R: Read>(reader: R, path: &Path) -> Result<Vec<CitizenRecord>> {
  let mut rdr = csv::ReaderBuilder::new()
    .has_headers(true)
    .from_reader(reader);

  let headers = rdr.headers().map_err(|e| csv_error(path, e))?.clone();
  if headers.is_empty() {
    // Zero-byte file: treated the same as a missing one.
    return Ok(Vec::new());
  }

  let found: Vec<&str> = headers
    .iter()
    .map(|h| h.trim_matches('\u{feff}').trim())
    .collect();
  if found != COLUMNS {
    return Err(Error::corrupt(1, format!("unexpected header {found:?}")));
  }

  let mut records = Vec::new();
  for row in rdr.records() {
    let row = row.map_err(|e| csv_error(path, e))?;
    let line = row.position().map(|p| p.line()).unwrap_or_default();
    let raw: RawRow = row
      .deserialize(Some(&headers))
      .map_err(|e| Error::corrupt(line, e.to_string()))?;
    records.push(raw.into_record(line)?);
  }
  Ok(records)
}

/// Split csv errors into I/O failures and malformed input.
fn csv_error(path: &Path, err: csv::Error) -> Error {
  let line = err.position().map(|p| p.line()).unwrap_or_default();
  let reason = err.to_string();
  match err.into_kind() {
    csv::ErrorKind::Io(source) => Error::storage(path, source),
    _ => Error::corrupt(line, reason),
  }
}

// ─── Writing ─────────────────────────────────────────────────────────────────

/// Serialise the full table, header included, into memory.
pub fn encode_records(records: &[CitizenRecord]) -> Result<Vec<u8>> {
  let mut wtr = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(Vec::new());
  wtr.write_record(COLUMNS)?;
  for record in records {
    wtr.serialize(RawRow::from(record))?;
  }
  wtr
    .into_inner()
    .map_err(|e| Error::Csv(csv::Error::from(e.into_error())))
}
