//! tabula server binary.
//!
//! Reads `tabula.toml` (or the path specified with `--config`), opens the
//! SQLite database, reconciles its schema against the descriptor directory,
//! and serves the REST API over HTTP.
//!
//! # Schema-only mode
//!
//! To apply the descriptors without starting the server:
//!
//! ```
//! cargo run -p tabula-server --bin tabula -- --reconcile-only
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tabula_server::{ServerConfig, prepare_schema};
use tabula_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tabula REST server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tabula.toml")]
  config: PathBuf,

  /// Reconcile the database schema, print a summary and exit.
  #[arg(long)]
  reconcile_only: bool,
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

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store = SqliteStore::open(&server_cfg.database_path)
    .await
    .with_context(|| format!("failed to open database at {:?}", server_cfg.database_path))?;

  let report = prepare_schema(&store, &server_cfg.schema_dir)
    .await
    .context("schema setup failed")?;

  // Helper mode: reconcile and exit.
  if cli.reconcile_only {
    print!("{report}");
    return Ok(());
  }

  let app = tabula_api::api_router(Arc::new(store));
  let address = server_cfg.address();

  tracing::info!("Server is running on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("Server stopped");
  Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
