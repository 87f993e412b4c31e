use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use rapport_core::{
  memory::MemoryStore,
  store::{MatchStore, ProfileStore},
};
use rapport_server::{ServerConfig, StoreKind};
use rapport_store_sqlite::SqliteStore;
use rapport_upstream::{HttpIdentityLookup, HttpProfileLookup, UpstreamConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rapport matching server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RAPPORT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let identity = HttpIdentityLookup::new(
    UpstreamConfig::new(server_cfg.identity_url.clone())
      .with_timeout(server_cfg.upstream_timeout()),
  )
  .context("failed to build identity client")?;
  let profiles = HttpProfileLookup::new(
    UpstreamConfig::new(server_cfg.profile_url.clone())
      .with_timeout(server_cfg.upstream_timeout()),
  )
  .context("failed to build profile client")?;

  match server_cfg.store {
    StoreKind::Sqlite => {
      // Expand `~` in store path.
      let store_path = expand_tilde(&server_cfg.store_path);
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;
      tracing::info!(path = ?store_path, "using sqlite store");
      serve(&server_cfg, identity, profiles, store).await
    }
    StoreKind::Memory => {
      tracing::warn!("using in-memory store; matches are lost on restart");
      serve(&server_cfg, identity, profiles, MemoryStore::new()).await
    }
  }
}

async fn serve<S>(
  server_cfg: &ServerConfig,
  identity: HttpIdentityLookup,
  profiles: HttpProfileLookup,
  store: S,
) -> anyhow::Result<()>
where
  S: ProfileStore + MatchStore + Clone + 'static,
{
  let lifecycle = rapport_server::lifecycle(server_cfg, identity, profiles, store);
  let app = rapport_server::router(Arc::new(lifecycle));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
