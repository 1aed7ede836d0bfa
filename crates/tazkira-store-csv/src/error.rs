//! Error type for `tazkira-store-csv`.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Reading, writing, or renaming a file failed.
  #[error("storage error at {}: {source}", .path.display())]
  Storage {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  /// A persisted row does not decode into a well-formed record.
  #[error("corrupt record at line {line}: {reason}")]
  CorruptRecord { line: u64, reason: String },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("identifier {0:?} cannot be used as a file name")]
  UnsafeIdentifier(String),

  #[error("background task failed: {0}")]
  Background(#[from] tokio::task::JoinError),
}

impl Error {
  pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Storage { path: path.into(), source }
  }

  pub(crate) fn corrupt(line: u64, reason: impl Into<String>) -> Self {
    Self::CorruptRecord { line, reason: reason.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
