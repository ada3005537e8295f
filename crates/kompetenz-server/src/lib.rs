//! HTTP server for Kompetenz.
//!
//! Composes the read API of [`kompetenz_api`] with the snapshot management
//! endpoints in [`admin`], all sharing one [`Orchestrator`].

pub mod admin;
pub mod config;
pub mod error;

pub use config::ServerConfig;
pub use error::ServerError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use kompetenz_ingest::LanguageDetector;
use kompetenz_rebuild::{OracleFactory, Orchestrator};
use tower_http::trace::TraceLayer;

/// Build the complete application router.
///
/// Management paths answer with and without a trailing slash, matching the
/// spellings existing clients use.
pub fn router<F, L>(orchestrator: Arc<Orchestrator<F, L>>) -> Router
where
  F: OracleFactory,
  L: LanguageDetector + Clone + 'static,
{
  let api = kompetenz_api::api_router(orchestrator.active().clone());

  Router::new()
    .route("/", get(admin::root))
    .route("/rebuild", post(admin::rebuild::<F, L>))
    .route("/rebuild/", post(admin::rebuild::<F, L>))
    .route("/add_entries", post(admin::add_entries::<F, L>))
    .route("/add_entries/", post(admin::add_entries::<F, L>))
    .route("/change_active_database", post(admin::change_active_database::<F, L>))
    .route("/change_active_database/", post(admin::change_active_database::<F, L>))
    .route("/get_database_info", get(admin::database_info::<F, L>))
    .route("/get_database_info/", get(admin::database_info::<F, L>))
    .with_state(orchestrator)
    .merge(api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
