//! Rebuild Orchestrator: background builds of new snapshots, incremental
//! additions to the active snapshot, and activation.
//!
//! A build runs as a detached tokio task. The request that starts it returns
//! once the snapshot file exists with its schema and the catalog entry is
//! registered. Whatever way the task ends, it marks its catalog entry as
//! stopped.
//!
//! At most one incremental addition runs at a time; it holds the staging lock
//! from diffing until its rows are recorded. Activations are serialized so the
//! catalog and the served snapshot always agree.

use std::{
  future::Future,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use chrono::Utc;
use kompetenz_core::{active::ActiveStore, oracle_model::OracleModel, store::CompetencyStore};
use kompetenz_ingest::{
  HttpOracle, IngestReport, Ingestor, LanguageDetector, RelevancyOracle, SourceRow,
  incremental::Staging, source,
};
use kompetenz_store_sqlite::SqliteStore;
use tokio::{sync::Mutex, task::JoinHandle};
use uuid::Uuid;

use crate::{Error, Result, catalog::Catalog, progress::CatalogProgress};

/// Snapshot file extension.
pub const SNAPSHOT_EXTENSION: &str = "sqlite3";

// ─── Oracles ─────────────────────────────────────────────────────────────────

/// Builds the oracle client a run uses for its model.
pub trait OracleFactory: Send + Sync + 'static {
  type Oracle: RelevancyOracle + 'static;

  fn oracle(&self, model: OracleModel) -> Result<Self::Oracle>;
}

/// [`HttpOracle`]s against one oracle service.
#[derive(Debug, Clone)]
pub struct HttpOracleFactory {
  pub base_url: String,
  pub timeout:  Duration,
}

impl OracleFactory for HttpOracleFactory {
  type Oracle = HttpOracle;

  fn oracle(&self, model: OracleModel) -> Result<HttpOracle> {
    HttpOracle::new(&self.base_url, model, self.timeout).map_err(|e| Error::Oracle(Box::new(e)))
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RebuildConfig {
  /// Directory receiving new snapshot files.
  pub snapshot_dir: PathBuf,
  /// Full source read by every rebuild.
  pub source_csv:   PathBuf,
  /// Holds `current.csv` and `last_added.csv`.
  pub staging_dir:  PathBuf,
  /// Running builds silent for longer than this are marked stopped.
  pub stale_after:  Duration,
}

/// A started background run.
pub struct Run {
  pub snapshot: String,
  pub task:     JoinHandle<()>,
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

pub struct Orchestrator<F, L> {
  config:     RebuildConfig,
  catalog:    Arc<Catalog>,
  active:     Arc<ActiveStore<SqliteStore>>,
  oracles:    Arc<F>,
  language:   L,
  staging:    Arc<Mutex<Staging>>,
  activation: Mutex<()>,
}

impl<F, L> Orchestrator<F, L>
where
  F: OracleFactory,
  L: LanguageDetector + Clone + 'static,
{
  /// Recover from the previous process: reap builds that died with it and
  /// serve the snapshot the catalog marks active, or an empty placeholder.
  pub async fn start(
    config: RebuildConfig,
    catalog: Arc<Catalog>,
    oracles: F,
    language: L,
  ) -> Result<Self> {
    reap(&catalog, config.stale_after).await?;

    let active = match catalog.get_active_name().await? {
      Some(name) => {
        let entry = catalog.entry(&name).await?;
        let store = SqliteStore::open(&entry.path).await?;
        tracing::info!(snapshot = %name, path = %entry.path, "serving active snapshot");
        ActiveStore::new(Some(name), Arc::new(store))
      }
      None => {
        tracing::warn!("no active snapshot; serving an empty placeholder");
        ActiveStore::new(None, Arc::new(SqliteStore::open_in_memory().await?))
      }
    };

    let staging = Staging::new(&config.staging_dir);
    Ok(Self {
      config,
      catalog,
      active: Arc::new(active),
      oracles: Arc::new(oracles),
      language,
      staging: Arc::new(Mutex::new(staging)),
      activation: Mutex::new(()),
    })
  }

  pub fn catalog(&self) -> &Arc<Catalog> { &self.catalog }

  pub fn active(&self) -> &Arc<ActiveStore<SqliteStore>> { &self.active }

  // ── Rebuild ───────────────────────────────────────────────────────────────

  /// Create a new snapshot and fill it from the full source in the
  /// background.
  pub async fn rebuild(&self, model: OracleModel) -> Result<Run> {
    let oracle = self.oracles.oracle(model)?;

    let now = Utc::now();
    let name = format!(
      "{}_{}_{}",
      model.name(),
      now.format("%Y%m%d%H%M%S"),
      Uuid::new_v4().simple()
    );
    let path = snapshot_path(&self.config.snapshot_dir, &name);

    tokio::fs::create_dir_all(&self.config.snapshot_dir).await?;
    let store = SqliteStore::open(&path).await?;
    self.catalog.register(&name, &path, model.name(), now).await?;
    tracing::info!(snapshot = %name, model = model.name(), "rebuild started");

    let ingestor = Ingestor::new(Arc::new(store), oracle, self.language.clone());
    let progress = CatalogProgress::new(self.catalog.clone(), &name);
    let source_csv = self.config.source_csv.clone();

    let task = tokio::spawn(run_to_completion(progress.clone(), async move {
      let rows = load_rows(source_csv).await?;
      let report = ingestor.ingest_all(&rows, &progress).await?;
      log_stats(progress.snapshot(), ingestor.store().as_ref()).await;
      Ok::<_, Error>(report)
    }));

    Ok(Run { snapshot: name, task })
  }

  // ── Incremental ───────────────────────────────────────────────────────────

  /// Stage `csv_text` and ingest its rows that are not yet recorded as
  /// ingested into the active snapshot, in the background.
  ///
  /// Malformed CSV is rejected before anything is staged. While an earlier
  /// addition is still running, new ones fail with
  /// [`Error::AdditionInProgress`].
  ///
  /// When the run aborts, the rows finished before the failure are still
  /// recorded, so a resubmission only retries the rest.
  pub async fn add_entries(&self, model: OracleModel, csv_text: String) -> Result<Run> {
    let submitted = source::read_rows(csv_text.as_bytes())?;
    let Some(name) = self.active.name() else {
      return Err(Error::NoActiveSnapshot);
    };
    let oracle = self.oracles.oracle(model)?;

    let guard = self
      .staging
      .clone()
      .try_lock_owned()
      .map_err(|_| Error::AdditionInProgress)?;
    let staging = guard.clone();
    let pending = tokio::task::spawn_blocking(move || -> Result<Vec<SourceRow>> {
      staging.write_last_added(&csv_text)?;
      Ok(staging.pending()?)
    })
    .await??;
    tracing::info!(
      snapshot = %name,
      submitted = submitted.len(),
      new = pending.len(),
      "incremental addition started"
    );

    self.catalog.mark_running(&name).await?;

    let ingestor = Ingestor::new(self.active.get(), oracle, self.language.clone());
    let progress = CatalogProgress::new(self.catalog.clone(), &name);

    let task = tokio::spawn(run_to_completion(progress.clone(), async move {
      let result = ingestor.ingest_all(&pending, &progress).await;
      let finished = match &result {
        Ok(_) => pending.len(),
        Err(kompetenz_ingest::Error::Aborted { completed, .. }) => *completed,
        Err(_) => 0,
      };

      let staging = guard.clone();
      tokio::task::spawn_blocking(move || staging.record_ingested(&pending[..finished]))
        .await??;
      drop(guard);

      let report = result?;
      log_stats(progress.snapshot(), ingestor.store().as_ref()).await;
      Ok::<_, Error>(report)
    }));

    Ok(Run { snapshot: name, task })
  }

  // ── Activation ────────────────────────────────────────────────────────────

  /// Serve `name` from now on.
  ///
  /// The snapshot's own file is opened, so later edits land in it. Unfinished
  /// snapshots can be activated.
  pub async fn activate(&self, name: &str) -> Result<()> {
    let _serial = self.activation.lock().await;
    let entry = self.catalog.entry(name).await?;
    let store = if self.active.name().as_deref() == Some(name) {
      self.active.get()
    } else {
      Arc::new(SqliteStore::open(&entry.path).await?)
    };

    self.catalog.set_active(name).await?;
    self.active.replace(name, store);
    tracing::info!(snapshot = %name, path = %entry.path, "snapshot activated");
    Ok(())
  }

  // ── Staleness ─────────────────────────────────────────────────────────────

  /// Reap stale builds every `every` until the task is aborted.
  pub fn spawn_reaper(&self, every: Duration) -> JoinHandle<()> {
    let catalog = self.catalog.clone();
    let stale_after = self.config.stale_after;
    tokio::spawn(async move {
      let mut ticks = tokio::time::interval(every);
      ticks.tick().await;
      loop {
        ticks.tick().await;
        if let Err(e) = reap(&catalog, stale_after).await {
          tracing::error!(error = %e, "reaping stale builds failed");
        }
      }
    })
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub fn snapshot_path(dir: &Path, name: &str) -> PathBuf {
  dir.join(format!("{name}.{SNAPSHOT_EXTENSION}"))
}

async fn reap(catalog: &Catalog, stale_after: Duration) -> Result<()> {
  let threshold = chrono::Duration::from_std(stale_after).unwrap_or(chrono::Duration::MAX);
  for name in catalog.reap_stale(Utc::now(), threshold).await? {
    tracing::warn!(snapshot = %name, "build showed no sign of life; marked stopped");
  }
  Ok(())
}

async fn load_rows(path: PathBuf) -> Result<Vec<SourceRow>> {
  let rows = tokio::task::spawn_blocking(move || source::read_rows_from_path(path)).await??;
  Ok(rows)
}

async fn log_stats<S: CompetencyStore>(snapshot: &str, store: &S) {
  match store.stats().await {
    Ok(stats) => tracing::info!(
      snapshot,
      abstracts = stats.abstracts,
      authors = stats.authors,
      competencies = stats.competencies,
      "snapshot contents"
    ),
    Err(e) => tracing::warn!(snapshot, error = %e, "could not count snapshot rows"),
  }
}

/// Drive `work`, log how it ended and mark the run stopped either way.
async fn run_to_completion(
  progress: CatalogProgress,
  work: impl Future<Output = Result<IngestReport>> + Send,
) {
  let snapshot = progress.snapshot().to_owned();
  match work.await {
    Ok(report) => tracing::info!(
      snapshot = %snapshot,
      attempted = report.attempted,
      ingested = report.ingested,
      skipped = report.skipped,
      "run finished"
    ),
    Err(e) => tracing::error!(snapshot = %snapshot, error = %e, "run stopped early"),
  }
  if let Err(e) = progress.catalog().mark_stopped(&snapshot).await {
    tracing::error!(snapshot = %snapshot, error = %e, "could not mark run stopped");
  }
}
