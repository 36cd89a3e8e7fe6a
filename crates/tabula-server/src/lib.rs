//! Startup wiring for the Tabula server: configuration and schema setup.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the store, runs
//! [`prepare_schema`] and only then starts serving the REST API.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tabula_core::{loader::load_descriptors, reconcile::ReconcileReport};
use tabula_store_sqlite::SqliteStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Sources, lowest precedence first: built-in defaults, the optional TOML
/// file, `TABULA_*` environment variables, and finally `PORT`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
  #[serde(default = "default_schema_dir")]
  pub schema_dir:    PathBuf,
}

fn default_host() -> String { "0.0.0.0".into() }

fn default_port() -> u16 { 3000 }

fn default_database_path() -> PathBuf { PathBuf::from("mydatabase.db") }

fn default_schema_dir() -> PathBuf { PathBuf::from("schemas") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          default_host(),
      port:          default_port(),
      database_path: default_database_path(),
      schema_dir:    default_schema_dir(),
    }
  }
}

impl ServerConfig {
  /// Load configuration from `path` (which may be absent) and the process
  /// environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_sources(path, std::env::var("PORT").ok())
  }

  fn from_sources(
    path: &Path,
    port: Option<String>,
  ) -> Result<Self, config::ConfigError> {
    let mut cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TABULA"))
      .set_override_option("port", port)?
      .build()?
      .try_deserialize()?;

    cfg.database_path = expand_tilde(&cfg.database_path);
    cfg.schema_dir = expand_tilde(&cfg.schema_dir);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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

// ─── Schema setup ─────────────────────────────────────────────────────────────

/// Load every descriptor in `schema_dir` and reconcile the database against
/// them.
///
/// Descriptors that fail to load are logged and skipped so the others are
/// still applied, but the call then fails: the server must not serve traffic
/// against a schema it could not fully set up. Reconciliation failures on
/// individual tables or columns are only logged.
pub async fn prepare_schema(
  store: &SqliteStore,
  schema_dir: &Path,
) -> anyhow::Result<ReconcileReport> {
  let loaded = load_descriptors(schema_dir)
    .with_context(|| format!("failed to load descriptors from {schema_dir:?}"))?;

  for error in &loaded.errors {
    tracing::error!(error = %error, "skipping descriptor");
  }

  let report = store.reconcile(&loaded.tables).await;
  for table in &report.tables {
    if table.is_clean() {
      tracing::info!("{table}");
    } else {
      tracing::warn!("{table}");
    }
  }

  if !loaded.is_complete() {
    anyhow::bail!(
      "{} descriptor(s) in {schema_dir:?} could not be loaded",
      loaded.errors.len()
    );
  }
  Ok(report)
}
