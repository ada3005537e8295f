//! End-to-end router tests: management endpoints driving a real orchestrator
//! over temporary directories, with a scripted oracle.

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use kompetenz_core::{model::Relevancy, oracle_model::OracleModel};
use kompetenz_ingest::{LanguageDetector, RelevancyOracle};
use kompetenz_rebuild::{Catalog, OracleFactory, Orchestrator, RebuildConfig};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::router;

// ─── Fakes ───────────────────────────────────────────────────────────────────

struct FixedOracle;

impl RelevancyOracle for FixedOracle {
  type Error = std::convert::Infallible;

  async fn competencies(
    &self,
    _text: &str,
  ) -> Result<Vec<(String, Relevancy)>, Self::Error> {
    Ok(vec![("databases".to_owned(), Relevancy::Scored(0.7))])
  }

  async fn category_of(&self, _competency: &str) -> Result<i64, Self::Error> { Ok(1) }
}

struct Fixed;

impl OracleFactory for Fixed {
  type Oracle = FixedOracle;

  fn oracle(&self, _model: OracleModel) -> kompetenz_rebuild::Result<FixedOracle> {
    Ok(FixedOracle)
  }
}

#[derive(Clone)]
struct AllEnglish;

impl LanguageDetector for AllEnglish {
  fn is_english(&self, _text: &str) -> bool { true }
}

// ─── Fixture ─────────────────────────────────────────────────────────────────

const SOURCE: &str = "\
Abstract,Title,Doc-Type,Authors,Year,Institutions
Query planning,T,Article,\"Codd, Edgar\",1970,IBM
";

type TestOrchestrator = Orchestrator<Fixed, AllEnglish>;

async fn setup(dir: &TempDir) -> (Router, Arc<TestOrchestrator>) {
  std::fs::write(dir.path().join("data.csv"), SOURCE).unwrap();
  let config = RebuildConfig {
    snapshot_dir: dir.path().join("databases"),
    source_csv:   dir.path().join("data.csv"),
    staging_dir:  dir.path().join("csv_files"),
    stale_after:  Duration::from_secs(3600),
  };
  let catalog = Arc::new(Catalog::new(dir.path().join("databases/database_info.json")));
  let orchestrator =
    Arc::new(Orchestrator::start(config, catalog, Fixed, AllEnglish).await.unwrap());
  (router(orchestrator.clone()), orchestrator)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
  send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap();
  send(app, req).await
}

/// Poll the catalog until `snapshot` is no longer running.
async fn wait_for(orchestrator: &TestOrchestrator, snapshot: &str) {
  for _ in 0..200 {
    let entry = orchestrator.catalog().entry(snapshot).await.unwrap();
    if !entry.build_status.is_running {
      return;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
  panic!("build {snapshot} did not finish");
}

async fn rebuilt(app: &Router, orchestrator: &TestOrchestrator) -> String {
  let (status, body) = post(app, "/rebuild", json!({ "model": "keybert" })).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  let snapshot = body["snapshot"].as_str().unwrap().to_owned();
  wait_for(orchestrator, &snapshot).await;
  snapshot
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn database_info_starts_empty() {
  let dir = tempfile::tempdir().unwrap();
  let (app, _) = setup(&dir).await;

  assert_eq!(get(&app, "/get_database_info").await, (StatusCode::OK, json!({})));
  assert_eq!(get(&app, "/get_database_info/").await, (StatusCode::OK, json!({})));
}

#[tokio::test]
async fn reads_answer_empty_before_any_activation() {
  let dir = tempfile::tempdir().unwrap();
  let (app, _) = setup(&dir).await;

  assert_eq!(get(&app, "/all_authors").await, (StatusCode::OK, json!([])));
  let (status, categories) = get(&app, "/all_categories").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(categories.as_array().unwrap().len(), 32);
}

// ─── Rebuild and activation ──────────────────────────────────────────────────

#[tokio::test]
async fn rebuild_then_activate_serves_the_new_snapshot() {
  let dir = tempfile::tempdir().unwrap();
  let (app, orchestrator) = setup(&dir).await;

  let snapshot = rebuilt(&app, &orchestrator).await;

  let (_, info) = get(&app, "/get_database_info/").await;
  let entry = &info[snapshot.as_str()];
  assert_eq!(entry["model"], "KEYBERT");
  assert_eq!(entry["active"], "False");
  assert_eq!(entry["build_status"]["is_running"], "False");
  assert_eq!(entry["build_status"]["at"], 1);

  let (status, body) =
    post(&app, "/change_active_database/", json!({ "new_database": snapshot })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["active"], snapshot.as_str());

  let (_, authors) = get(&app, "/all_authors").await;
  assert_eq!(authors[0]["last_name"], "Codd");
  let (_, info) = get(&app, "/get_database_info").await;
  assert_eq!(info[snapshot.as_str()]["active"], "True");
}

#[tokio::test]
async fn rebuild_rejects_unknown_models() {
  let dir = tempfile::tempdir().unwrap();
  let (app, _) = setup(&dir).await;

  let (status, body) = post(&app, "/rebuild", json!({ "model": "gpt-5" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("gpt-5"));
  assert_eq!(get(&app, "/get_database_info").await.1, json!({}));
}

#[tokio::test]
async fn activating_an_unknown_snapshot_is_not_found() {
  let dir = tempfile::tempdir().unwrap();
  let (app, _) = setup(&dir).await;

  let (status, _) =
    post(&app, "/change_active_database", json!({ "new_database": "missing" })).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Incremental ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_entries_without_active_snapshot_conflicts() {
  let dir = tempfile::tempdir().unwrap();
  let (app, _) = setup(&dir).await;

  let (status, _) =
    post(&app, "/add_entries/", json!({ "model": "BLOOM", "file": SOURCE })).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn add_entries_rejects_foreign_csv() {
  let dir = tempfile::tempdir().unwrap();
  let (app, _) = setup(&dir).await;

  let (status, _) = post(
    &app,
    "/add_entries/",
    json!({ "model": "BLOOM", "file": "name,age\nx,1\n" }),
  )
  .await;
  assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn add_entries_extends_the_active_snapshot() {
  let dir = tempfile::tempdir().unwrap();
  let (app, orchestrator) = setup(&dir).await;
  let snapshot = rebuilt(&app, &orchestrator).await;
  post(&app, "/change_active_database", json!({ "new_database": snapshot })).await;

  let file = "\
Abstract,Title,Doc-Type,Authors,Year,Institutions
Relational model,T,Article,\"Chen, Peter\",1976,MIT
";
  let (status, body) =
    post(&app, "/add_entries/", json!({ "model": "KEYBERT", "file": file })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["snapshot"], snapshot.as_str());
  wait_for(&orchestrator, &snapshot).await;

  let (_, authors) = get(&app, "/all_authors").await;
  assert_eq!(authors.as_array().unwrap().len(), 2);
  assert!(dir.path().join("csv_files/current.csv").exists());
}
