//! Entity and relation lookups against the active snapshot.
//!
//! | Method | Path | Answers |
//! |--------|------|---------|
//! | `GET` | `/all_categories` | `[Category]` |
//! | `GET` | `/all_competencies/` | `[Competency]` |
//! | `GET` | `/all_authors` | `[Author]` |
//! | `GET` | `/abstract_by_id/{abstract_id}` | `AbstractRecord` or `null` |
//! | `GET` | `/author_by_abstract_id/{abstract_id}` | `[Author]` |
//! | `GET` | `/competencies_by_abstract_id/{abstract_id}` | `[AbstractCompetency]` |
//! | `GET` | `/competencies_by_author_id/{author_id}` | `[AuthorCompetency]` |
//! | `GET` | `/competencies_by_category_id/{category_id}` | `[Competency]` |
//! | `GET` | `/authors_by_competency_id/{competency_id}` | `[CompetencyEvidence]` |
//! | `GET` | `/authors_with_competency/{competency_name}` | `[AuthorWithCompetency]` |
//! | `GET` | `/abstract_by_author/{first_name}/{last_name}` | `[AuthorAbstract]` |
//! | `GET` | `/category_name/{category_id}` | string or `null` |
//! | `GET` | `/competency_name_by_id/{competency_id}` | string or `null` |
//! | `GET` | `/competency_id_by_name/{competency_name}` | integer or `null` |
//! | `GET` | `/author_by_id/{author_id}` | `Author` or `null` |
//! | `GET` | `/author_id_by_full_name/{full_name}` | integer or `null` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kompetenz_core::{
  active::ActiveStore,
  model::{
    AbstractCompetency, AbstractRecord, Author, AuthorAbstract,
    AuthorCompetency, AuthorWithCompetency, Category, Competency,
    CompetencyEvidence,
  },
  store::CompetencyStore,
};

use crate::error::ApiError;

type Reply<T> = Result<Json<T>, ApiError>;

// ─── Listings ────────────────────────────────────────────────────────────────

pub async fn all_categories<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
) -> Reply<Vec<Category>> {
  let store = active.get();
  Ok(Json(store.all_categories().await.map_err(ApiError::store)?))
}

pub async fn all_competencies<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
) -> Reply<Vec<Competency>> {
  let store = active.get();
  Ok(Json(store.all_competencies().await.map_err(ApiError::store)?))
}

pub async fn all_authors<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
) -> Reply<Vec<Author>> {
  let store = active.get();
  Ok(Json(store.all_authors().await.map_err(ApiError::store)?))
}

// ─── By abstract ─────────────────────────────────────────────────────────────

pub async fn abstract_by_id<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(abstract_id): Path<i64>,
) -> Reply<Option<AbstractRecord>> {
  let store = active.get();
  Ok(Json(store.abstract_by_id(abstract_id).await.map_err(ApiError::store)?))
}

pub async fn authors_by_abstract<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(abstract_id): Path<i64>,
) -> Reply<Vec<Author>> {
  let store = active.get();
  Ok(Json(
    store
      .authors_by_abstract(abstract_id)
      .await
      .map_err(ApiError::store)?,
  ))
}

pub async fn competencies_by_abstract<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(abstract_id): Path<i64>,
) -> Reply<Vec<AbstractCompetency>> {
  let store = active.get();
  Ok(Json(
    store
      .competencies_by_abstract(abstract_id)
      .await
      .map_err(ApiError::store)?,
  ))
}

// ─── By author ───────────────────────────────────────────────────────────────

pub async fn competencies_by_author<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(author_id): Path<i64>,
) -> Reply<Vec<AuthorCompetency>> {
  let store = active.get();
  Ok(Json(
    store
      .competencies_by_author(author_id)
      .await
      .map_err(ApiError::store)?,
  ))
}

pub async fn abstracts_by_author_name<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path((first_name, last_name)): Path<(String, String)>,
) -> Reply<Vec<AuthorAbstract>> {
  let store = active.get();
  Ok(Json(
    store
      .abstracts_by_author_name(&first_name, &last_name)
      .await
      .map_err(ApiError::store)?,
  ))
}

pub async fn author_by_id<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(author_id): Path<i64>,
) -> Reply<Option<Author>> {
  let store = active.get();
  Ok(Json(store.author_by_id(author_id).await.map_err(ApiError::store)?))
}

pub async fn author_id_by_full_name<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(full_name): Path<String>,
) -> Reply<Option<i64>> {
  let store = active.get();
  Ok(Json(
    store
      .author_id_by_full_name(&full_name)
      .await
      .map_err(ApiError::store)?,
  ))
}

// ─── By competency / category ────────────────────────────────────────────────

pub async fn authors_by_competency<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(competency_id): Path<i64>,
) -> Reply<Vec<CompetencyEvidence>> {
  let store = active.get();
  Ok(Json(
    store
      .authors_by_competency(competency_id)
      .await
      .map_err(ApiError::store)?,
  ))
}

pub async fn authors_with_competency<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(competency_name): Path<String>,
) -> Reply<Vec<AuthorWithCompetency>> {
  let store = active.get();
  Ok(Json(
    store
      .authors_with_competency(&competency_name)
      .await
      .map_err(ApiError::store)?,
  ))
}

pub async fn competencies_by_category<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(category_id): Path<i64>,
) -> Reply<Vec<Competency>> {
  let store = active.get();
  Ok(Json(
    store
      .competencies_by_category(category_id)
      .await
      .map_err(ApiError::store)?,
  ))
}

pub async fn category_name<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(category_id): Path<i64>,
) -> Reply<Option<String>> {
  let store = active.get();
  Ok(Json(store.category_name(category_id).await.map_err(ApiError::store)?))
}

pub async fn competency_name<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(competency_id): Path<i64>,
) -> Reply<Option<String>> {
  let store = active.get();
  Ok(Json(
    store
      .competency_name(competency_id)
      .await
      .map_err(ApiError::store)?,
  ))
}

pub async fn competency_id_by_name<S: CompetencyStore>(
  State(active): State<Arc<ActiveStore<S>>>,
  Path(competency_name): Path<String>,
) -> Reply<Option<i64>> {
  let store = active.get();
  Ok(Json(
    store
      .competency_id_by_name(&competency_name)
      .await
      .map_err(ApiError::store)?,
  ))
}
