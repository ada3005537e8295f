//! Error types for `kompetenz-rebuild`.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// A snapshot name that the catalog does not know.
  #[error("unknown snapshot: {0}")]
  UnknownSnapshot(String),

  #[error("no snapshot is active")]
  NoActiveSnapshot,

  #[error("an incremental addition is already running")]
  AdditionInProgress,

  #[error("catalog io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("catalog is not valid json: {0}")]
  CatalogFormat(#[from] serde_json::Error),

  #[error(transparent)]
  Core(#[from] kompetenz_core::Error),

  #[error("ingestion failed: {0}")]
  Ingest(#[from] kompetenz_ingest::Error),

  #[error("store error: {0}")]
  Store(#[from] kompetenz_store_sqlite::Error),

  #[error("oracle unavailable: {0}")]
  Oracle(#[source] BoxError),

  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
