//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tazkira-store-csv`).
//! Higher layers (`tazkira-api`, `tazkira-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  citizen::{CitizenRecord, NationalId, PhotoRef},
  stats::RegistryStats,
};

/// Abstraction over an append-only citizen record store.
///
/// Records are never updated or deleted. Identifiers are not checked for
/// uniqueness; appending a record whose identifier already exists succeeds
/// and both rows are kept.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read every persisted record in insertion order. A store with no backing
  /// data yields an empty collection.
  fn load(
    &self,
  ) -> impl Future<Output = Result<Vec<CitizenRecord>, Self::Error>> + Send + '_;

  /// Persist one more record and return it as stored.
  ///
  /// The write is all-or-nothing from the caller's point of view.
  fn append(
    &self,
    record: CitizenRecord,
  ) -> impl Future<Output = Result<CitizenRecord, Self::Error>> + Send + '_;

  /// The first record whose identifier equals `id` exactly, or `None`.
  fn find_by_identifier<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<CitizenRecord>, Self::Error>> + Send + 'a;

  /// Aggregate counts over the full collection.
  fn stats(
    &self,
  ) -> impl Future<Output = Result<RegistryStats, Self::Error>> + Send + '_;

  /// The full collection in the store's interchange format, for download.
  fn export(
    &self,
  ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send + '_;

  /// Durably write a captured photo for `id` and return the reference to put
  /// in the record. An existing photo is never replaced, even when `id`
  /// repeats.
  ///
  /// Must complete before the record that references the photo is appended.
  fn store_photo<'a>(
    &'a self,
    id: &'a NationalId,
    bytes: Vec<u8>,
    media_type: &'a str,
  ) -> impl Future<Output = Result<PhotoRef, Self::Error>> + Send + 'a;

  /// Remove a photo written by [`store_photo`](Self::store_photo) whose
  /// record was never appended. Markers and already-missing files are a
  /// no-op.
  fn discard_photo<'a>(
    &'a self,
    photo: &'a PhotoRef,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
