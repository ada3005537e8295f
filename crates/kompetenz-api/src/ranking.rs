//! Ranking endpoints.
//!
//! | Method | Path | Answers |
//! |--------|------|---------|
//! | `GET` | `/ranking_score/{author_id}/{competency_id}` | number |
//! | `GET` | `/ranked_authors_by_competency_id/{competency_id}` | `[RankedAuthor]` |
//! | `GET` | `/ranked_competencies_by_author_id/{author_id}` | `[RankedCompetency]` |
//!
//! Missing or unscored evidence yields a score of `0`, never an error.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kompetenz_core::{
  active::ActiveStore,
  ranking::{self, RankedAuthor, RankedCompetency},
  store::CompetencyStore,
};

use crate::error::ApiError;

pub async fn ranking_score<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path((author_id, competency_id)): Path<(i64, i64)>,
) -> Result<Json<f64>, ApiError> {
  let store = active.get();
  let score = ranking::ranking_score(store.as_ref(), author_id, competency_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(score))
}

pub async fn ranked_authors<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(competency_id): Path<i64>,
) -> Result<Json<Vec<RankedAuthor>>, ApiError> {
  let store = active.get();
  let ranked = ranking::rank_authors(store.as_ref(), competency_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ranked))
}

pub async fn ranked_competencies<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(author_id): Path<i64>,
) -> Result<Json<Vec<RankedCompetency>>, ApiError> {
  let store = active.get();
  let ranked = ranking::rank_competencies(store.as_ref(), author_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(ranked))
}
