//! JSON read and curation API over the active snapshot.
//!
//! Exposes an axum [`Router`] backed by an [`ActiveStore`] of any
//! [`CompetencyStore`]. Every request resolves the active snapshot once, so an
//! activation never splits a request across two snapshots.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(kompetenz_api::api_router(orchestrator.active().clone()))
//! ```

pub mod curation;
pub mod error;
pub mod lookup;
pub mod ranking;

use std::sync::Arc;

use axum::{Router, routing::get};
use kompetenz_core::{active::ActiveStore, store::CompetencyStore};

pub use error::ApiError;

/// Build the API router for `active`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(active: Arc<ActiveStore<S>>) -> Router<()>
where
  S: CompetencyStore + 'static,
{
  Router::new()
    // Listings
    .route("/all_categories", get(lookup::all_categories::<S>))
    .route("/all_competencies/", get(lookup::all_competencies::<S>))
    .route("/all_authors", get(lookup::all_authors::<S>))
    // Abstracts
    .route("/abstract_by_id/{abstract_id}", get(lookup::abstract_by_id::<S>))
    .route("/author_by_abstract_id/{abstract_id}", get(lookup::authors_by_abstract::<S>))
    .route(
      "/competencies_by_abstract_id/{abstract_id}",
      get(lookup::competencies_by_abstract::<S>),
    )
    .route(
      "/abstract_by_author/{first_name}/{last_name}",
      get(lookup::abstracts_by_author_name::<S>),
    )
    // Authors
    .route("/competencies_by_author_id/{author_id}", get(lookup::competencies_by_author::<S>))
    .route("/author_by_id/{author_id}", get(lookup::author_by_id::<S>))
    .route("/author_id_by_full_name/{full_name}", get(lookup::author_id_by_full_name::<S>))
    // Competencies and categories
    .route(
      "/authors_by_competency_id/{competency_id}",
      get(lookup::authors_by_competency::<S>),
    )
    .route(
      "/authors_with_competency/{competency_name}",
      get(lookup::authors_with_competency::<S>),
    )
    .route(
      "/competencies_by_category_id/{category_id}",
      get(lookup::competencies_by_category::<S>),
    )
    .route("/category_name/{category_id}", get(lookup::category_name::<S>))
    .route("/competency_name_by_id/{competency_id}", get(lookup::competency_name::<S>))
    .route(
      "/competency_id_by_name/{competency_name}",
      get(lookup::competency_id_by_name::<S>),
    )
    // Ranking
    .route("/ranking_score/{author_id}/{competency_id}", get(ranking::ranking_score::<S>))
    .route(
      "/ranked_authors_by_competency_id/{competency_id}",
      get(ranking::ranked_authors::<S>),
    )
    .route(
      "/ranked_competencies_by_author_id/{author_id}",
      get(ranking::ranked_competencies::<S>),
    )
    // Curation
    .route(
      "/change_status/{author_id}/{competency_id}/{status}",
      get(curation::change_status::<S>),
    )
    .route(
      "/abstracts_with_competency/{competency_id}/{author_id}",
      get(curation::abstracts_with_competency::<S>),
    )
    .with_state(active)
}

#[cfg(test)]
mod tests;
