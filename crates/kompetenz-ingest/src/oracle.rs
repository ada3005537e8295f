//! The Relevancy Oracle: the external model service that extracts
//! competencies from abstract text and maps competencies to categories.

use std::{future::Future, time::Duration};

use kompetenz_core::{category, model::Relevancy, oracle_model::OracleModel};
use reqwest::{Client, Url};

use crate::error::OracleError;

/// Source of `(competency, relevancy)` pairs and competency categories.
pub trait RelevancyOracle: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Competencies found in `text`, in the order the oracle reports them.
  fn competencies<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<(String, Relevancy)>, Self::Error>> + Send + 'a;

  /// Category id of `competency`, within the fixed category list.
  fn category_of<'a>(
    &'a self,
    competency: &'a str,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;
}

/// Oracle reached over HTTP.
///
/// Text arguments travel as single percent-encoded path segments:
/// `GET /<model endpoint>/<text>[/<suffix>]` and
/// `GET /get_category_of_competency/<name>`.
#[derive(Clone)]
pub struct HttpOracle {
  client: Client,
  base:   Url,
  model:  OracleModel,
}

impl HttpOracle {
  pub fn new(
    base_url: &str,
    model: OracleModel,
    timeout: Duration,
  ) -> Result<Self, OracleError> {
    let base =
      Url::parse(base_url).map_err(|_| OracleError::BaseUrl(base_url.to_owned()))?;
    if base.cannot_be_a_base() {
      return Err(OracleError::BaseUrl(base_url.to_owned()));
    }
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base, model })
  }

  pub fn model(&self) -> OracleModel { self.model }

  fn url<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Result<Url, OracleError> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| OracleError::BaseUrl(self.base.to_string()))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }
}

impl RelevancyOracle for HttpOracle {
  type Error = OracleError;

  async fn competencies(&self, text: &str) -> Result<Vec<(String, Relevancy)>, OracleError> {
    let endpoint = self.model.endpoint();
    let url = self.url(
      std::iter::once(endpoint)
        .chain(std::iter::once(text))
        .chain(self.model.endpoint_suffix().iter().copied()),
    )?;

    let pairs: Vec<(String, f64)> = self
      .client
      .get(url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    tracing::debug!(endpoint, found = pairs.len(), "oracle extracted competencies");
    Ok(
      pairs
        .into_iter()
        .map(|(name, relevancy)| (name, Relevancy::from_wire(relevancy)))
        .collect(),
    )
  }

  async fn category_of(&self, competency: &str) -> Result<i64, OracleError> {
    let url = self.url(["get_category_of_competency", competency])?;

    let id: i64 = self
      .client
      .get(url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    Ok(category::validate_id(id)?)
  }
}
