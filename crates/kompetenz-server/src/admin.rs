//! Snapshot management endpoints.
//!
//! | Method | Path | Body | Answers |
//! |--------|------|------|---------|
//! | `POST` | `/rebuild` | `{"model"}` | `{"snapshot"}` of the build just started |
//! | `POST` | `/add_entries/` | `{"model", "file"}` | `{"snapshot"}` receiving the rows |
//! | `POST` | `/change_active_database` | `{"new_database"}` | `{"active"}` |
//! | `GET`  | `/get_database_info` | | the catalog JSON as stored |
//!
//! Builds run in the background; their progress shows up in
//! `/get_database_info`. A CSV upload lacking required columns is a 415.

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::header,
  response::IntoResponse,
};
use kompetenz_core::oracle_model::OracleModel;
use kompetenz_ingest::LanguageDetector;
use kompetenz_rebuild::{OracleFactory, Orchestrator};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

#[derive(Debug, Deserialize)]
pub struct RebuildBody {
  pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct AddEntriesBody {
  pub model: String,
  /// CSV text with a header line.
  pub file:  String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeActiveBody {
  pub new_database: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Started {
  pub snapshot: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Activated {
  pub active: String,
}

/// `GET /`
pub async fn root() -> Json<&'static str> {
  Json("Kompetenz database API. Snapshots are listed at /get_database_info.")
}

/// `POST /rebuild`
pub async fn rebuild<F, L>(
  State(orchestrator): State<Arc<Orchestrator<F, L>>>,
  Json(body): Json<RebuildBody>,
) -> Result<Json<Started>, ServerError>
where
  F: OracleFactory,
  L: LanguageDetector + Clone + 'static,
{
  let model = OracleModel::parse(&body.model)?;
  let run = orchestrator.rebuild(model).await?;
  Ok(Json(Started { snapshot: run.snapshot }))
}

/// `POST /add_entries/`
pub async fn add_entries<F, L>(
  State(orchestrator): State<Arc<Orchestrator<F, L>>>,
  Json(body): Json<AddEntriesBody>,
) -> Result<Json<Started>, ServerError>
where
  F: OracleFactory,
  L: LanguageDetector + Clone + 'static,
{
  let model = OracleModel::parse(&body.model)?;
  let run = orchestrator.add_entries(model, body.file).await?;
  Ok(Json(Started { snapshot: run.snapshot }))
}

/// `POST /change_active_database`
pub async fn change_active_database<F, L>(
  State(orchestrator): State<Arc<Orchestrator<F, L>>>,
  Json(body): Json<ChangeActiveBody>,
) -> Result<Json<Activated>, ServerError>
where
  F: OracleFactory,
  L: LanguageDetector + Clone + 'static,
{
  orchestrator.activate(&body.new_database).await?;
  Ok(Json(Activated { active: body.new_database }))
}

/// `GET /get_database_info`
pub async fn database_info<F, L>(
  State(orchestrator): State<Arc<Orchestrator<F, L>>>,
) -> Result<impl IntoResponse, ServerError>
where
  F: OracleFactory,
  L: LanguageDetector + Clone + 'static,
{
  let raw = orchestrator.catalog().raw().await.map_err(ServerError::Rebuild)?;
  Ok(([(header::CONTENT_TYPE, "application/json")], raw))
}
