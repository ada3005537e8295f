//! Integration tests for `SqliteStore` against an in-memory database.

use kompetenz_core::{
  category::CATEGORY_COUNT,
  model::{AbstractRecord, Relevancy, Status},
  ranking::{FAILURE_SCORE, rank_authors, rank_competencies, ranking_score},
  store::CompetencyStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn record(abstract_id: i64) -> AbstractRecord {
  AbstractRecord {
    abstract_id,
    year: 2020,
    title: format!("Title {abstract_id}"),
    content: format!("Content of abstract {abstract_id}"),
    doctype: "Article".to_owned(),
    institution: "University of Hamburg".to_owned(),
  }
}

/// Write an abstract authored by `author_id`.
async fn authored(s: &SqliteStore, abstract_id: i64, author_id: i64) {
  assert!(s.insert_abstract(record(abstract_id)).await.unwrap());
  assert!(s.insert_written_by(abstract_id, author_id).await.unwrap());
}

fn assert_close(actual: f64, expected: f64) {
  assert!(
    (actual - expected).abs() < 1e-9,
    "expected {expected}, got {actual}"
  );
}

// ─── Upserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_author_is_idempotent() {
  let s = store().await;

  let a = s.upsert_author("Ada", "Lovelace").await.unwrap();
  let b = s.upsert_author("Ada", "Lovelace").await.unwrap();
  let c = s.upsert_author("Alan", "Turing").await.unwrap();

  assert_eq!(a, b);
  assert_ne!(a, c);
  assert_eq!(s.all_authors().await.unwrap().len(), 2);
}

#[tokio::test]
async fn upsert_competency_is_idempotent() {
  let s = store().await;

  let a = s.upsert_competency("machine learning").await.unwrap();
  let b = s.upsert_competency("machine learning").await.unwrap();

  assert_eq!(a, b);
  assert_eq!(
    s.competency_id_by_name("machine learning").await.unwrap(),
    Some(a)
  );
  assert_eq!(
    s.competency_name(a).await.unwrap().as_deref(),
    Some("machine learning")
  );
}

#[tokio::test]
async fn first_available_abstract_id_starts_at_zero() {
  let s = store().await;
  assert_eq!(s.first_available_abstract_id().await.unwrap(), 0);
}

#[tokio::test]
async fn first_available_abstract_id_fills_gaps() {
  let s = store().await;
  s.insert_abstract(record(0)).await.unwrap();
  s.insert_abstract(record(2)).await.unwrap();
  assert_eq!(s.first_available_abstract_id().await.unwrap(), 1);

  s.insert_abstract(record(1)).await.unwrap();
  assert_eq!(s.first_available_abstract_id().await.unwrap(), 3);
}

#[tokio::test]
async fn first_available_abstract_id_ignores_late_start() {
  let s = store().await;
  s.insert_abstract(record(5)).await.unwrap();
  assert_eq!(s.first_available_abstract_id().await.unwrap(), 0);
}

// ─── Inserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn abstract_roundtrips() {
  let s = store().await;
  s.insert_abstract(record(7)).await.unwrap();

  let fetched = s.abstract_by_id(7).await.unwrap().unwrap();
  assert_eq!(fetched, record(7));
  assert!(s.abstract_by_id(8).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_abstract_id_is_reported_not_raised() {
  let s = store().await;
  assert!(s.insert_abstract(record(0)).await.unwrap());
  assert!(!s.insert_abstract(record(0)).await.unwrap());
}

#[tokio::test]
async fn duplicate_edges_are_tolerated() {
  let s = store().await;
  let comp = s.upsert_competency("optics").await.unwrap();

  assert!(s.insert_has_category(3, comp).await.unwrap());
  assert!(!s.insert_has_category(3, comp).await.unwrap());

  assert!(s.insert_written_by(0, 1).await.unwrap());
  assert!(!s.insert_written_by(0, 1).await.unwrap());

  assert!(
    s.insert_derived_from(comp, 0, Relevancy::Scored(0.4))
      .await
      .unwrap()
  );
  assert!(
    !s.insert_derived_from(comp, 0, Relevancy::Scored(0.9))
      .await
      .unwrap()
  );

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.has_category, 1);
  assert_eq!(stats.written_by, 1);
  assert_eq!(stats.derived_from, 1);
}

#[tokio::test]
async fn edges_may_precede_their_abstract() {
  let s = store().await;
  let comp = s.upsert_competency("optics").await.unwrap();
  let author = s.upsert_author("Jane", "Doe").await.unwrap();

  assert!(
    s.insert_derived_from(comp, 0, Relevancy::Scored(0.4))
      .await
      .unwrap()
  );
  assert!(s.insert_written_by(0, author).await.unwrap());
  assert!(s.insert_abstract(record(0)).await.unwrap());

  let stats = s.stats().await.unwrap();
  assert_eq!((stats.abstracts, stats.written_by, stats.derived_from), (1, 1, 1));
  assert_eq!(s.abstracts_with_competency(comp, author).await.unwrap(), [0]);
}

#[tokio::test]
async fn out_of_range_category_is_rejected() {
  let s = store().await;
  let comp = s.upsert_competency("optics").await.unwrap();
  assert!(s.insert_has_category(CATEGORY_COUNT as i64, comp).await.is_err());
  assert!(s.insert_has_category(-1, comp).await.is_err());
}

#[tokio::test]
async fn has_competency_keeps_existing_status() {
  let s = store().await;
  let author = s.upsert_author("Ada", "Lovelace").await.unwrap();
  let comp = s.upsert_competency("analysis").await.unwrap();

  assert!(
    s.insert_has_competency(author, comp, Status::Unvalidated)
      .await
      .unwrap()
  );
  assert!(
    s.change_competency_status(author, comp, Status::Validated)
      .await
      .unwrap()
  );
  assert!(
    !s.insert_has_competency(author, comp, Status::Unvalidated)
      .await
      .unwrap()
  );

  let comps = s.competencies_by_author(author).await.unwrap();
  assert_eq!(comps.len(), 1);
  assert_eq!(comps[0].status, Status::Validated);
  assert_eq!(comps[0].competency_name, "analysis");
}

#[tokio::test]
async fn change_status_of_missing_edge_changes_nothing() {
  let s = store().await;
  assert!(
    !s.change_competency_status(1, 1, Status::Hidden)
      .await
      .unwrap()
  );
  assert_eq!(s.stats().await.unwrap().has_competency, 0);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn categories_are_seeded() {
  let s = store().await;
  let cats = s.all_categories().await.unwrap();
  assert_eq!(cats.len(), CATEGORY_COUNT);
  assert_eq!(cats[0].category_id, 0);
  assert_eq!(s.category_name(0).await.unwrap().as_deref(), Some("Mathematics"));
  assert!(s.category_name(CATEGORY_COUNT as i64).await.unwrap().is_none());
}

#[tokio::test]
async fn reopening_does_not_duplicate_categories() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("snapshot.sqlite3");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    let author = s.upsert_author("Ada", "Lovelace").await.unwrap();
    authored(&s, 0, author).await;
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let stats = s.stats().await.unwrap();
  assert_eq!(stats.categories, CATEGORY_COUNT as u64);
  assert_eq!(stats.abstracts, 1);
  assert_eq!(stats.authors, 1);
}

#[tokio::test]
async fn reads_on_empty_store_are_empty() {
  let s = store().await;
  assert!(s.authors_by_abstract(0).await.unwrap().is_empty());
  assert!(s.competencies_by_abstract(0).await.unwrap().is_empty());
  assert!(s.competencies_by_author(0).await.unwrap().is_empty());
  assert!(s.competencies_by_category(0).await.unwrap().is_empty());
  assert!(s.authors_by_competency(0).await.unwrap().is_empty());
  assert!(s.authors_with_competency("nothing").await.unwrap().is_empty());
  assert!(s.abstracts_by_author_name("No", "One").await.unwrap().is_empty());
  assert!(s.all_competencies().await.unwrap().is_empty());
  assert!(s.author_by_id(0).await.unwrap().is_none());
  assert!(s.author_id_by_full_name("No One").await.unwrap().is_none());
}

#[tokio::test]
async fn graph_reads_follow_edges() {
  let s = store().await;
  let ada = s.upsert_author("Ada", "Lovelace").await.unwrap();
  let charles = s.upsert_author("Charles", "Babbage").await.unwrap();
  let comp = s.upsert_competency("difference engines").await.unwrap();

  authored(&s, 0, ada).await;
  s.insert_written_by(0, charles).await.unwrap();
  s.insert_derived_from(comp, 0, Relevancy::Unscored).await.unwrap();
  s.insert_has_category(12, comp).await.unwrap();
  s.insert_has_competency(ada, comp, Status::Unvalidated).await.unwrap();

  let authors = s.authors_by_abstract(0).await.unwrap();
  let names: Vec<_> = authors.iter().map(|a| a.full_name()).collect();
  assert_eq!(names, ["Ada Lovelace", "Charles Babbage"]);

  let comps = s.competencies_by_abstract(0).await.unwrap();
  assert_eq!(comps.len(), 1);
  assert_eq!(comps[0].relevancy, Relevancy::Unscored);

  let in_category = s.competencies_by_category(12).await.unwrap();
  assert_eq!(in_category[0].competency_id, comp);

  let evidence = s.authors_by_competency(comp).await.unwrap();
  assert_eq!(evidence.len(), 1);
  assert_eq!(evidence[0].author_id, ada);
  assert_eq!(evidence[0].abstract_id, 0);

  let holders = s.authors_with_competency("difference engines").await.unwrap();
  assert_eq!(holders.len(), 1);
  assert_eq!(holders[0].first_name, "Ada");

  assert_eq!(
    s.author_id_by_full_name("Charles Babbage").await.unwrap(),
    Some(charles)
  );

  let abstracts = s.abstracts_by_author_name("Ada", "Lovelace").await.unwrap();
  assert_eq!(abstracts.len(), 1);
  assert_eq!(abstracts[0].institution, "University of Hamburg");
}

// ─── Ranking against the store ───────────────────────────────────────────────

/// Ada wrote four abstracts, two of which evidence `comp` (0.6 and 0.8).
/// Grace wrote one abstract evidencing `comp` at 0.9.
async fn ranking_fixture(s: &SqliteStore) -> (i64, i64, i64) {
  let ada = s.upsert_author("Ada", "Lovelace").await.unwrap();
  let grace = s.upsert_author("Grace", "Hopper").await.unwrap();
  let comp = s.upsert_competency("compilers").await.unwrap();

  for id in 0..4 {
    authored(s, id, ada).await;
  }
  authored(s, 4, grace).await;

  s.insert_derived_from(comp, 0, Relevancy::Scored(0.6)).await.unwrap();
  s.insert_derived_from(comp, 1, Relevancy::Scored(0.8)).await.unwrap();
  s.insert_derived_from(comp, 4, Relevancy::Scored(0.9)).await.unwrap();
  s.insert_has_competency(ada, comp, Status::Unvalidated).await.unwrap();
  s.insert_has_competency(grace, comp, Status::Validated).await.unwrap();

  (ada, grace, comp)
}

#[tokio::test]
async fn ranking_score_from_store() {
  let s = store().await;
  let (ada, grace, comp) = ranking_fixture(&s).await;

  assert_close(ranking_score(&s, ada, comp).await.unwrap(), 0.85);
  assert_close(ranking_score(&s, grace, comp).await.unwrap(), 0.9);
}

#[tokio::test]
async fn ranking_score_without_evidence_is_zero() {
  let s = store().await;
  let (ada, _, _) = ranking_fixture(&s).await;
  let other = s.upsert_competency("gardening").await.unwrap();

  assert_eq!(ranking_score(&s, ada, other).await.unwrap(), FAILURE_SCORE);
  assert_eq!(ranking_score(&s, 99, other).await.unwrap(), FAILURE_SCORE);
}

#[tokio::test]
async fn unscored_relevancy_zeroes_the_score() {
  let s = store().await;
  let (ada, _, comp) = ranking_fixture(&s).await;
  s.insert_derived_from(comp, 2, Relevancy::Unscored).await.unwrap();

  assert_eq!(ranking_score(&s, ada, comp).await.unwrap(), FAILURE_SCORE);
}

#[tokio::test]
async fn namesakes_share_one_author_and_pool_their_abstracts() {
  let s = store().await;
  let comp = s.upsert_competency("optics").await.unwrap();

  // Two different people called Jane Doe, each with one abstract.
  let first = s.upsert_author("Jane", "Doe").await.unwrap();
  authored(&s, 0, first).await;
  s.insert_derived_from(comp, 0, Relevancy::Scored(0.8)).await.unwrap();

  let second = s.upsert_author("Jane", "Doe").await.unwrap();
  authored(&s, 1, second).await;

  assert_eq!(first, second);
  assert_eq!(s.abstracts_by_author_name("Jane", "Doe").await.unwrap().len(), 2);
  // Proportion 1/2 over both people's output: 0.8 + 0.5 * 0.2.
  assert_close(ranking_score(&s, first, comp).await.unwrap(), 0.9);
}

#[tokio::test]
async fn rank_authors_orders_by_score() {
  let s = store().await;
  let (ada, grace, comp) = ranking_fixture(&s).await;

  let ranked = rank_authors(&s, comp).await.unwrap();
  let ids: Vec<_> = ranked.iter().map(|r| r.author_id).collect();
  assert_eq!(ids, [grace, ada]);
  assert_eq!(ranked[0].status, Status::Validated);
}

#[tokio::test]
async fn rank_competencies_orders_by_score() {
  let s = store().await;
  let (ada, _, comp) = ranking_fixture(&s).await;
  let weak = s.upsert_competency("typewriters").await.unwrap();
  s.insert_derived_from(weak, 3, Relevancy::Scored(0.1)).await.unwrap();
  s.insert_has_competency(ada, weak, Status::Unvalidated).await.unwrap();

  let ranked = rank_competencies(&s, ada).await.unwrap();
  let ids: Vec<_> = ranked.iter().map(|r| r.competency_id).collect();
  assert_eq!(ids, [comp, weak]);
}
