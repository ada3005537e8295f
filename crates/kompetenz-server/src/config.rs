//! Runtime configuration, read once at start-up.

use std::{path::PathBuf, time::Duration};

use kompetenz_rebuild::{HttpOracleFactory, RebuildConfig};
use serde::Deserialize;

/// Server configuration, deserialised from `config.toml` and `KOMPETENZ_*`
/// environment variables. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub catalog_path:        PathBuf,
  pub snapshot_dir:        PathBuf,
  pub source_csv:          PathBuf,
  pub staging_dir:         PathBuf,
  pub oracle_url:          String,
  pub oracle_timeout_secs: u64,
  pub stale_after_secs:    u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "0.0.0.0".to_owned(),
      port:                8020,
      catalog_path:        PathBuf::from("databases/database_info.json"),
      snapshot_dir:        PathBuf::from("databases"),
      source_csv:          PathBuf::from("db_creation/csv_files/data.csv"),
      staging_dir:         PathBuf::from("db_creation/csv_files"),
      oracle_url:          "http://model_api:8010".to_owned(),
      oracle_timeout_secs: 600,
      stale_after_secs:    3600,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn rebuild(&self) -> RebuildConfig {
    RebuildConfig {
      snapshot_dir: self.snapshot_dir.clone(),
      source_csv:   self.source_csv.clone(),
      staging_dir:  self.staging_dir.clone(),
      stale_after:  Duration::from_secs(self.stale_after_secs),
    }
  }

  pub fn oracles(&self) -> HttpOracleFactory {
    HttpOracleFactory {
      base_url: self.oracle_url.clone(),
      timeout:  Duration::from_secs(self.oracle_timeout_secs),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_sources_fall_back_to_defaults() {
    let cfg: ServerConfig = ::config::Config::builder()
      .set_override("port", 9000)
      .unwrap()
      .set_override("oracle_url", "http://localhost:8010")
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.oracles().base_url, "http://localhost:8010");
    assert_eq!(cfg.rebuild().stale_after, Duration::from_secs(3600));
    assert_eq!(cfg.catalog_path, PathBuf::from("databases/database_info.json"));
  }
}
