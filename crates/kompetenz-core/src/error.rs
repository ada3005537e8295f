//! Error types for `kompetenz-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown competency status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown oracle model: {0:?}")]
  UnknownModel(String),

  #[error("category id {0} is outside the fixed category list")]
  CategoryOutOfRange(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
