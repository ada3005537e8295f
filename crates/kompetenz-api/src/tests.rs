//! Router tests against an in-memory SQLite snapshot.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode},
};
use kompetenz_core::{
  active::ActiveStore,
  model::{AbstractRecord, Relevancy, Status},
  store::CompetencyStore,
};
use kompetenz_store_sqlite::SqliteStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt as _;

use crate::api_router;

// ─── Fixture ─────────────────────────────────────────────────────────────────

struct Ids {
  ada:   i64,
  grace: i64,
  rust:  i64,
}

fn record(abstract_id: i64, title: &str) -> AbstractRecord {
  AbstractRecord {
    abstract_id,
    year: 2021,
    title: title.to_owned(),
    content: format!("Content of {title}"),
    doctype: "Article".to_owned(),
    institution: "KIT".to_owned(),
  }
}

/// Ada wrote abstracts 0 and 1, Grace wrote abstract 2; all three evidence
/// "rust". Ada scores 0.7 + 1.0 * 0.3 = 1.0, Grace scores 0.9.
async fn seeded() -> (SqliteStore, Ids) {
  let s = SqliteStore::open_in_memory().await.unwrap();
  let ada = s.upsert_author("Ada", "Lovelace").await.unwrap();
  let grace = s.upsert_author("Grace", "Hopper").await.unwrap();
  let rust = s.upsert_competency("rust").await.unwrap();
  s.insert_has_category(1, rust).await.unwrap();

  for (id, author, relevancy) in [(0, ada, 0.6), (1, ada, 0.8), (2, grace, 0.9)] {
    s.insert_abstract(record(id, &format!("Paper {id}"))).await.unwrap();
    s.insert_written_by(id, author).await.unwrap();
    s.insert_derived_from(rust, id, Relevancy::Scored(relevancy)).await.unwrap();
  }
  s.insert_has_competency(ada, rust, Status::Unvalidated).await.unwrap();
  s.insert_has_competency(grace, rust, Status::Unvalidated).await.unwrap();

  (s, Ids { ada, grace, rust })
}

async fn app() -> (Router, Ids) {
  let (store, ids) = seeded().await;
  let active = Arc::new(ActiveStore::new(Some("snap".to_owned()), Arc::new(store)));
  (api_router(active), ids)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
  let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_ok<T: DeserializeOwned>(app: &Router, uri: &str) -> T {
  let (status, body) = get(app, uri).await;
  assert_eq!(status, StatusCode::OK, "{uri}: {body}");
  serde_json::from_value(body).unwrap()
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn all_categories_lists_the_fixed_set() {
  let (app, _) = app().await;
  let body: Vec<Value> = get_ok(&app, "/all_categories").await;
  assert_eq!(body.len(), 32);
  assert_eq!(body[0]["name"], "Mathematics");
}

#[tokio::test]
async fn missing_entities_answer_null() {
  let (app, _) = app().await;
  assert_eq!(get(&app, "/abstract_by_id/99").await, (StatusCode::OK, Value::Null));
  assert_eq!(get(&app, "/author_by_id/99").await, (StatusCode::OK, Value::Null));
  assert_eq!(get(&app, "/category_name/99").await, (StatusCode::OK, Value::Null));
  assert_eq!(
    get(&app, "/competency_id_by_name/cobol").await,
    (StatusCode::OK, Value::Null)
  );
}

#[tokio::test]
async fn empty_queries_answer_an_empty_list() {
  let (app, _) = app().await;
  let body: Vec<Value> = get_ok(&app, "/competencies_by_author_id/99").await;
  assert!(body.is_empty());
}

#[tokio::test]
async fn lookups_follow_the_graph() {
  let (app, ids) = app().await;

  let abs: Value = get_ok(&app, "/abstract_by_id/1").await;
  assert_eq!(abs["title"], "Paper 1");

  let authors: Vec<Value> = get_ok(&app, "/author_by_abstract_id/2").await;
  assert_eq!(authors.len(), 1);
  assert_eq!(authors[0]["last_name"], "Hopper");

  let by_name: Vec<Value> = get_ok(&app, "/abstract_by_author/Ada/Lovelace").await;
  assert_eq!(by_name.len(), 2);

  let id: Option<i64> = get_ok(&app, "/author_id_by_full_name/Ada%20Lovelace").await;
  assert_eq!(id, Some(ids.ada));

  let comps: Vec<Value> = get_ok(&app, "/competencies_by_abstract_id/0").await;
  assert_eq!(comps[0]["competency_name"], "rust");
  assert_eq!(comps[0]["relevancy"], 0.6);

  let in_category: Vec<Value> = get_ok(&app, "/competencies_by_category_id/1").await;
  assert_eq!(in_category[0]["competency_id"], ids.rust);

  let name: Option<String> =
    get_ok(&app, &format!("/competency_name_by_id/{}", ids.rust)).await;
  assert_eq!(name.as_deref(), Some("rust"));

  let holders: Vec<Value> = get_ok(&app, "/authors_with_competency/rust").await;
  assert!(!holders.is_empty());
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn ranked_authors_put_the_broader_evidence_first() {
  let (app, ids) = app().await;

  let ranked: Vec<Value> =
    get_ok(&app, &format!("/ranked_authors_by_competency_id/{}", ids.rust)).await;
  let order: Vec<i64> = ranked.iter().map(|r| r["author_id"].as_i64().unwrap()).collect();
  assert_eq!(order, [ids.ada, ids.grace]);

  let score: f64 = get_ok(&app, &format!("/ranking_score/{}/{}", ids.grace, ids.rust)).await;
  assert!((score - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn ranking_score_without_evidence_is_zero() {
  let (app, ids) = app().await;
  let score: f64 = get_ok(&app, &format!("/ranking_score/99/{}", ids.rust)).await;
  assert_eq!(score, 0.0);
}

#[tokio::test]
async fn ranked_competencies_of_an_author() {
  let (app, ids) = app().await;
  let ranked: Vec<Value> =
    get_ok(&app, &format!("/ranked_competencies_by_author_id/{}", ids.ada)).await;
  assert_eq!(ranked.len(), 1);
  assert_eq!(ranked[0]["competency_name"], "rust");
  assert_eq!(ranked[0]["status"], "Unvalidated");
}

// ─── Curation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn change_status_updates_an_existing_edge() {
  let (app, ids) = app().await;

  let changed: bool =
    get_ok(&app, &format!("/change_status/{}/{}/Validated", ids.ada, ids.rust)).await;
  assert!(changed);

  let comps: Vec<Value> =
    get_ok(&app, &format!("/competencies_by_author_id/{}", ids.ada)).await;
  assert_eq!(comps[0]["status"], "Validated");
}

#[tokio::test]
async fn change_status_on_a_missing_edge_answers_false() {
  let (app, ids) = app().await;
  let changed: bool = get_ok(&app, &format!("/change_status/99/{}/Hidden", ids.rust)).await;
  assert!(!changed);
}

#[tokio::test]
async fn change_status_rejects_unknown_statuses() {
  let (app, ids) = app().await;
  let (status, body) =
    get(&app, &format!("/change_status/{}/{}/Approved", ids.ada, ids.rust)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("Approved"));
}

#[tokio::test]
async fn abstracts_with_competency_of_one_author() {
  let (app, ids) = app().await;
  let ids: Vec<i64> =
    get_ok(&app, &format!("/abstracts_with_competency/{}/{}", ids.rust, ids.ada)).await;
  assert_eq!(ids, [0, 1]);
}

// ─── Activation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn requests_follow_the_swapped_snapshot() {
  let (store, _) = seeded().await;
  let active = Arc::new(ActiveStore::new(Some("old".to_owned()), Arc::new(store)));
  let app = api_router(active.clone());

  let authors: Vec<Value> = get_ok(&app, "/all_authors").await;
  assert_eq!(authors.len(), 2);

  active.replace("new", Arc::new(SqliteStore::open_in_memory().await.unwrap()));
  let authors: Vec<Value> = get_ok(&app, "/all_authors").await;
  assert!(authors.is_empty());
}
