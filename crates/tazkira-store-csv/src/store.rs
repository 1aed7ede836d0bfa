//! [`CsvStore`] — the CSV implementation of [`RecordStore`].

use std::{
  io::{self, Write as _},
  path::{Path, PathBuf},
  sync::Arc,
};

use sha2::{Digest, Sha256};
use tazkira_core::{
  citizen::{CitizenRecord, NationalId, PhotoRef},
  stats::RegistryStats,
  store::RecordStore,
};
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  encode::{encode_records, read_records},
  schema::{DEFAULT_DB_FILE, DEFAULT_PHOTO_DIR},
};

// ─── Layout ──────────────────────────────────────────────────────────────────

/// Where a store keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
  /// Data directory; created on open.
  pub root:      PathBuf,
  /// Record table, relative to `root`.
  pub db_file:   PathBuf,
  /// Photo directory, relative to `root`.
  pub photo_dir: PathBuf,
}

impl StoreLayout {
  /// Default file names inside `root`.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root:      root.into(),
      db_file:   PathBuf::from(DEFAULT_DB_FILE),
      photo_dir: PathBuf::from(DEFAULT_PHOTO_DIR),
    }
  }

  pub fn db_path(&self) -> PathBuf { self.root.join(&self.db_file) }

  /// Resolve a [`PhotoRef::File`] path against the data directory.
  pub fn resolve(&self, photo: &PhotoRef) -> Option<PathBuf> {
    match photo {
      PhotoRef::File { path, .. } => Some(self.root.join(path)),
      PhotoRef::Marker { .. } => None,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A citizen record store backed by a single CSV file and a photo
/// directory.
///
/// Cloning is cheap — clones share the layout and the append lock.
#[derive(Clone)]
pub struct CsvStore {
  inner: Arc<Inner>,
}

struct Inner {
  layout:     StoreLayout,
  /// Serialises read-modify-write cycles within this process. The guard
  /// travels into the blocking job, so a cancelled append keeps the lock
  /// until its rewrite finishes. Other processes writing the same file can
  /// still lose updates.
  write_lock: Arc<Mutex<()>>,
}

impl CsvStore {
  /// Open a store at `layout`, creating the data directory if needed. The
  /// record table itself is created by the first append.
  pub async fn open(layout: StoreLayout) -> Result<Self> {
    tokio::fs::create_dir_all(&layout.root)
      .await
      .map_err(|e| Error::storage(&layout.root, e))?;
    tracing::info!(path = %layout.db_path().display(), "opened csv record store");
    Ok(Self {
      inner: Arc::new(Inner { layout, write_lock: Arc::new(Mutex::new(())) }),
    })
  }

  pub fn layout(&self) -> &StoreLayout { &self.inner.layout }
}

/// Run blocking file work off the async runtime.
async fn blocking<T, F>(work: F) -> Result<T>
where
  F: FnOnce() -> Result<T> + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(work).await?
}

/// Replace `path` with `bytes` so that readers see either the old or the new
/// contents, never a partial write.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  let mut tmp =
    tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::storage(dir, e))?;
  tmp.write_all(bytes).map_err(|e| Error::storage(tmp.path(), e))?;
  tmp
    .as_file()
    .sync_all()
    .map_err(|e| Error::storage(tmp.path(), e))?;
  tmp.persist(path).map_err(|e| Error::storage(path, e.error))?;
  Ok(())
}

/// Write `bytes` to a fresh file in `dir` named `<stem>.<ext>`, falling back
/// to `<stem>-1.<ext>`, `<stem>-2.<ext>`, … when the name is taken. Existing
/// files are never replaced. Returns the chosen file name.
fn write_new_file(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> Result<String> {
  let mut tmp =
    tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::storage(dir, e))?;
  tmp.write_all(bytes).map_err(|e| Error::storage(tmp.path(), e))?;
  tmp
    .as_file()
    .sync_all()
    .map_err(|e| Error::storage(tmp.path(), e))?;

  let mut attempt = 0u32;
  loop {
    let name = match attempt {
      0 => format!("{stem}.{ext}"),
      n => format!("{stem}-{n}.{ext}"),
    };
    let target = dir.join(&name);
    match tmp.persist_noclobber(&target) {
      Ok(_) => return Ok(name),
      Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
        tmp = e.file;
        attempt += 1;
      }
      Err(e) => return Err(Error::storage(target, e.error)),
    }
  }
}

fn photo_extension(media_type: &str) -> &'static str {
  match media_type.trim().to_ascii_lowercase().as_str() {
    "image/jpeg" | "image/jpg" => "jpg",
    "image/png" => "png",
    "image/webp" => "webp",
    _ => "bin",
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for CsvStore {
  type Error = Error;

  async fn load(&self) -> Result<Vec<CitizenRecord>> {
    let path = self.inner.layout.db_path();
    let records = blocking(move || read_records(&path)).await?;
    tracing::debug!(count = records.len(), "loaded citizen records");
    Ok(records)
  }

  async fn append(&self, record: CitizenRecord) -> Result<CitizenRecord> {
    let guard = Arc::clone(&self.inner.write_lock).lock_owned().await;

    let path = self.inner.layout.db_path();
    let stored = record.clone();
    let total = blocking(move || {
      let _guard = guard;
      let mut records = read_records(&path)?;
      records.push(record);
      write_atomically(&path, &encode_records(&records)?)?;
      Ok(records.len())
    })
    .await?;

    tracing::info!(
      national_id = %stored.national_id,
      province = %stored.province,
      total,
      "appended citizen record"
    );
    Ok(stored)
  }

  async fn find_by_identifier(&self, id: &str) -> Result<Option<CitizenRecord>> {
    Ok(
      self
        .load()
        .await?
        .into_iter()
        .find(|r| r.national_id.as_str() == id),
    )
  }

  async fn stats(&self) -> Result<RegistryStats> {
    Ok(RegistryStats::from_records(&self.load().await?))
  }

  async fn export(&self) -> Result<Vec<u8>> {
    let records = self.load().await?;
    blocking(move || encode_records(&records)).await
  }

  async fn store_photo(
    &self,
    id: &NationalId,
    bytes: Vec<u8>,
    media_type: &str,
  ) -> Result<PhotoRef> {
    let safe = !id.as_str().is_empty()
      && id
        .as_str()
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if !safe {
      return Err(Error::UnsafeIdentifier(id.to_string()));
    }

    let layout = &self.inner.layout;
    let dir = layout.root.join(&layout.photo_dir);
    let stem = id.to_string();
    let ext = photo_extension(media_type);
    let content_hash = hex::encode(Sha256::digest(&bytes));
    let size = bytes.len();

    let name = blocking(move || {
      std::fs::create_dir_all(&dir).map_err(|e| Error::storage(&dir, e))?;
      write_new_file(&dir, &stem, ext, &bytes)
    })
    .await?;

    let relative = layout.photo_dir.join(name);
    tracing::debug!(national_id = %id, size, path = %relative.display(), "stored citizen photo");
    Ok(PhotoRef::File {
      path: relative.to_string_lossy().replace('\\', "/"),
      content_hash,
    })
  }

  async fn discard_photo(&self, photo: &PhotoRef) -> Result<()> {
    let Some(target) = self.inner.layout.resolve(photo) else {
      return Ok(());
    };
    blocking(move || match std::fs::remove_file(&target) {
      Ok(()) => {
        tracing::debug!(path = %target.display(), "discarded citizen photo");
        Ok(())
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(Error::storage(target, e)),
    })
    .await
  }
}
