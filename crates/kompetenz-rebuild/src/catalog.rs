//! The snapshot catalog: one JSON file mapping snapshot names to their state.
//!
//! ```json
//! {
//!   "KEYBERT_20240101120000_…": {
//!     "model": "KEYBERT",
//!     "generated": "2024-01-01 12:00:00",
//!     "path": "databases/KEYBERT_20240101120000_….sqlite3",
//!     "active": "False",
//!     "build_status": { "is_running": "True", "at": 12, "from": 500,
//!                       "heartbeat": "2024-01-01T12:03:00Z" }
//!   }
//! }
//! ```
//!
//! Flags are written as `"True"`/`"False"` strings; JSON booleans are
//! accepted on read. `at` counts rows attempted, `from` rows announced.
//!
//! Every mutation loads the whole file, changes one entry and replaces the
//! whole file. Mutations are serialized by a process-wide lock so concurrent
//! progress updates cannot clobber each other.

use std::{
  collections::BTreeMap,
  io,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Error, Result};

// ─── Entries ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
  pub model:        String,
  pub generated:    String,
  pub path:         String,
  #[serde(with = "flag")]
  pub active:       bool,
  pub build_status: BuildStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStatus {
  #[serde(with = "flag")]
  pub is_running: bool,
  /// Rows attempted so far.
  pub at:         u64,
  /// Rows announced so far.
  pub from:       u64,
  /// Last sign of life of the build; absent in catalogs written by older
  /// versions.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub heartbeat:  Option<DateTime<Utc>>,
}

impl BuildStatus {
  /// Whether the build claims to run but has shown no sign of life since
  /// `stale_after` before `now`.
  pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
    self.is_running
      && self
        .heartbeat
        .is_none_or(|beat| now.signed_duration_since(beat) > stale_after)
  }
}

/// The whole catalog, keyed by snapshot name.
pub type Entries = BTreeMap<String, SnapshotEntry>;

mod flag {
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *value { "True" } else { "False" })
  }

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Repr {
    Bool(bool),
    Text(String),
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Repr::deserialize(d)? {
      Repr::Bool(b) => Ok(b),
      Repr::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
      Repr::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
      Repr::Text(s) => Err(D::Error::custom(format!("invalid flag {s:?}"))),
    }
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Handle on the catalog file. Share it behind an `Arc`; all mutations go
/// through the same lock.
pub struct Catalog {
  path: PathBuf,
  lock: Mutex<()>,
}

impl Catalog {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), lock: Mutex::new(()) }
  }

  pub fn path(&self) -> &Path { &self.path }

  /// The file's text as stored, `{}` when it does not exist yet.
  pub async fn raw(&self) -> Result<String> {
    let _guard = self.lock.lock().await;
    match tokio::fs::read_to_string(&self.path).await {
      Ok(text) => Ok(text),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok("{}".to_owned()),
      Err(e) => Err(e.into()),
    }
  }

  pub async fn entries(&self) -> Result<Entries> {
    let _guard = self.lock.lock().await;
    self.read().await
  }

  /// The entry named `name`.
  pub async fn entry(&self, name: &str) -> Result<SnapshotEntry> {
    self
      .entries()
      .await?
      .remove(name)
      .ok_or_else(|| Error::UnknownSnapshot(name.to_owned()))
  }

  /// Name of the active snapshot, if any.
  pub async fn get_active_name(&self) -> Result<Option<String>> {
    Ok(
      self
        .entries()
        .await?
        .into_iter()
        .find_map(|(name, entry)| entry.active.then_some(name)),
    )
  }

  /// Add a running, inactive entry with zeroed counters. An existing entry of
  /// the same name is replaced.
  pub async fn register(
    &self,
    name: &str,
    path: &Path,
    model: &str,
    generated: DateTime<Utc>,
  ) -> Result<()> {
    let entry = SnapshotEntry {
      model:        model.to_owned(),
      generated:    generated.format("%Y-%m-%d %H:%M:%S").to_string(),
      path:         path.to_string_lossy().into_owned(),
      active:       false,
      build_status: BuildStatus {
        is_running: true,
        at:         0,
        from:       0,
        heartbeat:  Some(generated),
      },
    };
    self
      .update(|entries| {
        entries.insert(name.to_owned(), entry);
        Ok(())
      })
      .await
  }

  pub async fn advance_total(&self, name: &str, n: u64) -> Result<()> {
    self
      .update_status(name, |status| status.from = status.from.saturating_add(n))
      .await
  }

  pub async fn advance_progress(&self, name: &str, n: u64) -> Result<()> {
    self
      .update_status(name, |status| status.at = status.at.saturating_add(n))
      .await
  }

  pub async fn mark_running(&self, name: &str) -> Result<()> {
    self.update_status(name, |status| status.is_running = true).await
  }

  /// Idempotent.
  pub async fn mark_stopped(&self, name: &str) -> Result<()> {
    self.update_status(name, |status| status.is_running = false).await
  }

  /// Make `name` the only active entry and return it.
  pub async fn set_active(&self, name: &str) -> Result<SnapshotEntry> {
    self
      .update(|entries| {
        if !entries.contains_key(name) {
          return Err(Error::UnknownSnapshot(name.to_owned()));
        }
        for (key, entry) in entries.iter_mut() {
          entry.active = key == name;
        }
        Ok(entries[name].clone())
      })
      .await
  }

  /// Mark every stale running entry as stopped and return their names.
  pub async fn reap_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> Result<Vec<String>> {
    self
      .update(|entries| {
        let mut reaped = Vec::new();
        for (name, entry) in entries.iter_mut() {
          if entry.build_status.is_stale(now, stale_after) {
            entry.build_status.is_running = false;
            reaped.push(name.clone());
          }
        }
        Ok(reaped)
      })
      .await
  }

  // ── File access ───────────────────────────────────────────────────────────

  async fn update_status(
    &self,
    name: &str,
    f: impl FnOnce(&mut BuildStatus),
  ) -> Result<()> {
    self
      .update(|entries| {
        let entry = entries
          .get_mut(name)
          .ok_or_else(|| Error::UnknownSnapshot(name.to_owned()))?;
        f(&mut entry.build_status);
        entry.build_status.heartbeat = Some(Utc::now());
        Ok(())
      })
      .await
  }

  /// Load, mutate and write back under the lock. Nothing is written when
  /// `f` fails.
  async fn update<T>(&self, f: impl FnOnce(&mut Entries) -> Result<T>) -> Result<T> {
    let _guard = self.lock.lock().await;
    let mut entries = self.read().await?;
    let out = f(&mut entries)?;
    self.write(&entries).await?;
    Ok(out)
  }

  async fn read(&self) -> Result<Entries> {
    match tokio::fs::read(&self.path).await {
      Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Entries::new()),
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
      Err(e) => Err(e.into()),
    }
  }

  /// Replace the file through a temporary sibling so readers never observe
  /// a half-written catalog.
  async fn write(&self, entries: &Entries) -> Result<()> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(dir).await?;
    }
    let tmp = self.path.with_extension("json.tmp");
    tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
    tokio::fs::rename(&tmp, &self.path).await?;
    Ok(())
  }
}
