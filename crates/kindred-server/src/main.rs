//! kindred-server binary.
//!
//! Startup runs in three steps: load [`ServerConfig`] from `config.toml` (or
//! `--config`) with `KINDRED_*` environment overrides, open the SQLite store
//! behind a [`Registry`], then serve [`kindred_server::router`].
//!
//! `--hash-password` instead reads a password from stdin, prints its argon2
//! PHC string for `auth.password_hash`, and exits:
//!
//! ```
//! cargo run -p kindred-server -- --hash-password
//! ```

use std::{
  io::{self, BufRead as _, Write as _},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::{Context as _, anyhow};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use kindred_core::Registry;
use kindred_server::{AppState, ServerConfig};
use kindred_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

const ENV_PREFIX: &str = "KINDRED";

#[derive(Parser)]
#[command(author, version, about = "Kindred family register server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_tracing();

  if cli.hash_password {
    println!("{}", hash_password(&prompt_password()?)?);
    return Ok(());
  }

  let server_cfg = load_config(&cli.config)?;
  let state = open_state(&server_cfg).await?;
  serve(&server_cfg, state).await
}

fn init_tracing() {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();
  tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ─── Startup ──────────────────────────────────────────────────────────────────

/// File values first, `KINDRED_HOST`, `KINDRED_REGISTRY__REQUIRE_LAST_NAME`
/// and friends on top. A missing file is not an error.
fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let env = config::Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__");
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(env)
    .build()
    .with_context(|| format!("failed to load configuration from {}", path.display()))?
    .try_deserialize()
    .context("invalid server configuration")
}

async fn open_state(server_cfg: &ServerConfig) -> anyhow::Result<AppState<SqliteStore>> {
  let store_path = expand_home(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;

  info!(
    store = %store_path.display(),
    on_missing_family = ?server_cfg.registry.on_missing_family,
    require_last_name = server_cfg.registry.require_last_name,
    write_gate = server_cfg.auth.is_some(),
    "registry ready"
  );

  Ok(AppState {
    registry: Arc::new(Registry::new(Arc::new(store), server_cfg.registry)),
    auth:     server_cfg.auth.clone().map(Arc::new),
  })
}

async fn serve(server_cfg: &ServerConfig, state: AppState<SqliteStore>) -> anyhow::Result<()> {
  let address = (server_cfg.host.as_str(), server_cfg.port);
  let listener = TcpListener::bind(address)
    .await
    .with_context(|| format!("failed to bind {}:{}", server_cfg.host, server_cfg.port))?;
  info!(address = %listener.local_addr()?, "listening");

  axum::serve(listener, kindred_server::router(state))
    .await
    .context("server error")
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn hash_password(password: &str) -> anyhow::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| anyhow!("argon2 error: {e}"))
}

fn prompt_password() -> anyhow::Result<String> {
  eprint!("Password: ");
  io::stderr().flush()?;
  let line = io::stdin()
    .lock()
    .lines()
    .next()
    .transpose()?
    .unwrap_or_default();
  Ok(line)
}

/// `~/rest` becomes `$HOME/rest`; any other path is returned unchanged.
fn expand_home(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
