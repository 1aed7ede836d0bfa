//! The canonical on-disk schema.
//!
//! One header row followed by one row per record, comma-delimited, fields
//! quoted when needed. Column meaning:
//!
//! | Column | Encoding |
//! |--------|----------|
//! | `national_id` | identifier as minted |
//! | `full_name`, `father_name` | free text, non-empty |
//! | `grandfather_name` | free text, empty when absent |
//! | `province` | display name, e.g. `Sar-e Pol` |
//! | `date_of_birth` | `YYYY-MM-DD` |
//! | `gender` | `male`, `female`, or empty |
//! | `photo_kind` | `marker` or `file` |
//! | `photo_ref` | marker label, or path relative to the data directory |
//! | `photo_sha256` | hex digest for `file` photos, empty for markers |
//! | `registered_at` | RFC 3339 UTC |

/// Header row, in column order.
pub const COLUMNS: [&str; 11] = [
  "national_id",
  "full_name",
  "father_name",
  "grandfather_name",
  "province",
  "date_of_birth",
  "gender",
  "photo_kind",
  "photo_ref",
  "photo_sha256",
  "registered_at",
];

/// File name of the record table inside the data directory.
pub const DEFAULT_DB_FILE: &str = "afghan_id_database.csv";

/// Photo directory, relative to the data directory.
pub const DEFAULT_PHOTO_DIR: &str = "photos";

pub(crate) const PHOTO_KIND_MARKER: &str = "marker";
pub(crate) const PHOTO_KIND_FILE: &str = "file";

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
