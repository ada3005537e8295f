//! Error type of the trigger endpoints and its [`IntoResponse`] mapping.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kompetenz_ingest::Error as IngestError;
use kompetenz_rebuild::Error as RebuildError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
  /// Unknown oracle model name.
  #[error(transparent)]
  Model(#[from] kompetenz_core::Error),

  #[error(transparent)]
  Rebuild(#[from] RebuildError),
}

impl ServerError {
  fn status(&self) -> StatusCode {
    match self {
      Self::Model(_) => StatusCode::BAD_REQUEST,
      Self::Rebuild(e) => match e {
        RebuildError::UnknownSnapshot(_) => StatusCode::NOT_FOUND,
        RebuildError::NoActiveSnapshot | RebuildError::AdditionInProgress => {
          StatusCode::CONFLICT
        }
        RebuildError::Core(_) => StatusCode::BAD_REQUEST,
        RebuildError::Ingest(IngestError::MissingColumns(_) | IngestError::Csv(_)) => {
          StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl IntoResponse for ServerError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "trigger request failed");
    } else {
      tracing::warn!(error = %self, %status, "trigger request rejected");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
