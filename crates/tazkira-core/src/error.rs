//! Error types for `tazkira-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("birth year {0} is not a four-digit year")]
  BirthYearOutOfRange(i32),

  #[error("unsupported identifier suffix width: {0} (expected 5 or 6)")]
  SuffixWidth(u32),

  #[error("unknown province: {0:?}")]
  UnknownProvince(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
