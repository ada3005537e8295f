//! Error types for `kompetenz-ingest`.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures that abort an ingestion batch.
#[derive(Debug, Error)]
pub enum Error {
  #[error("relevancy oracle failed: {0}")]
  Oracle(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("progress reporting failed: {0}")]
  Progress(#[source] BoxError),

  /// A batch stopped at row `completed`; the rows before it are in the
  /// snapshot.
  #[error("batch aborted after {completed} rows: {source}")]
  Aborted {
    completed: usize,
    #[source]
    source:    Box<Error>,
  },

  #[error("csv lacks required columns: {0:?}")]
  MissingColumns(Vec<&'static str>),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  pub(crate) fn oracle(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Oracle(Box::new(e))
  }

  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn progress(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Progress(Box::new(e))
  }
}

/// Errors of the HTTP oracle client.
#[derive(Debug, Error)]
pub enum OracleError {
  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("oracle base url {0:?} cannot carry path segments")]
  BaseUrl(String),

  #[error(transparent)]
  Core(#[from] kompetenz_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
