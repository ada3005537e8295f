//! Build counters reported straight into the catalog entry of a run.

use std::sync::Arc;

use kompetenz_ingest::Progress;

use crate::{Error, catalog::Catalog};

#[derive(Clone)]
pub struct CatalogProgress {
  catalog:  Arc<Catalog>,
  snapshot: String,
}

impl CatalogProgress {
  pub fn new(catalog: Arc<Catalog>, snapshot: &str) -> Self {
    Self { catalog, snapshot: snapshot.to_owned() }
  }

  pub fn snapshot(&self) -> &str { &self.snapshot }

  pub fn catalog(&self) -> &Arc<Catalog> { &self.catalog }
}

impl Progress for CatalogProgress {
  type Error = Error;

  async fn advance_total(&self, n: u64) -> Result<(), Error> {
    self.catalog.advance_total(&self.snapshot, n).await
  }

  async fn advance_progress(&self, n: u64) -> Result<(), Error> {
    self.catalog.advance_progress(&self.snapshot, n).await
  }
}
