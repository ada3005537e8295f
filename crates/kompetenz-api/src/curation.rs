//! Human curation of `(author, competency)` claims.
//!
//! | Method | Path | Answers |
//! |--------|------|---------|
//! | `GET` | `/change_status/{author_id}/{competency_id}/{status}` | `true` if an edge was updated |
//! | `GET` | `/abstracts_with_competency/{competency_id}/{author_id}` | `[abstract_id]` |
//!
//! `status` is one of `Hidden`, `Unvalidated`, `Validated`; anything else is a
//! 400. Changing the status of an edge that does not exist answers `false`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kompetenz_core::{active::ActiveStore, model::Status, store::CompetencyStore};

use crate::error::ApiError;

pub async fn change_status<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path((author_id, competency_id, status)): Path<(i64, i64, String)>,
) -> Result<Json<bool>, ApiError> {
  let status = Status::parse(&status).map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let store = active.get();
  let changed = store
    .change_competency_status(author_id, competency_id, status)
    .await
    .map_err(ApiError::store)?;

  if changed {
    tracing::info!(author_id, competency_id, %status, "competency status changed");
  }
  Ok(Json(changed))
}

pub async fn abstracts_with_competency<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path((competency_id, author_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<i64>>, ApiError> {
  let store = active.get();
  let ids = store
    .abstracts_with_competency(competency_id, author_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ids))
}
