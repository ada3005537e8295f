//! kompetenz-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `KOMPETENZ_*` environment variables, recovers the snapshot catalog, and
//! serves the read API and the snapshot management endpoints over HTTP.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use kompetenz_ingest::WhatlangDetector;
use kompetenz_rebuild::{Catalog, Orchestrator};
use kompetenz_server::ServerConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How often running builds are checked for staleness.
const REAP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(author, version, about = "Kompetenz competency graph server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("KOMPETENZ"))
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  let server_cfg = Arc::new(server_cfg);

  let catalog = Arc::new(Catalog::new(server_cfg.catalog_path.clone()));
  let orchestrator = Orchestrator::start(
    server_cfg.rebuild(),
    catalog,
    server_cfg.oracles(),
    WhatlangDetector,
  )
  .await
  .with_context(|| format!("failed to recover catalog {:?}", server_cfg.catalog_path))?;

  let _reaper = orchestrator.spawn_reaper(REAP_INTERVAL);

  let app = kompetenz_server::router(Arc::new(orchestrator));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
