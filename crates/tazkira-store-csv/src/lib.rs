//! CSV backend for the Tazkira record store.
//!
//! The whole collection lives in one delimited text file that is rewritten
//! on every append. Photos are kept as individual files next to it. All file
//! access runs on tokio's blocking pool so the async runtime is never
//! stalled.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::{COLUMNS, DEFAULT_DB_FILE, DEFAULT_PHOTO_DIR};
pub use store::{CsvStore, StoreLayout};
