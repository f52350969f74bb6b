//! subtrackd — the SubTrack daemon.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, starts the notification scheduler, and serves the JSON API
//! over HTTP. The scheduler runs on its own tokio tasks, so job execution
//! never blocks request handling. Ctrl-C drains the server and shuts the
//! scheduler down.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use subtrack_api::{ApiState, api_router};
use subtrack_core::clock::{Clock, SystemClock};
use subtrack_jobs::{JobScheduler, NotificationJobs};
use subtrack_notify::{Dispatcher, SmtpConfig, SmtpNotifier};
use subtrack_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "SubTrack subscription tracker daemon")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

/// Runtime configuration, deserialised from `config.toml` merged with
/// `SUBTRACK`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
struct DaemonConfig {
  host:       String,
  port:       u16,
  store_path: PathBuf,
  smtp:       SmtpConfig,
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
    .add_source(config::Environment::with_prefix("SUBTRACK"))
    .build()
    .context("failed to read config file")?;

  let daemon_cfg: DaemonConfig = settings
    .try_deserialize()
    .context("failed to deserialise DaemonConfig")?;

  // Open SQLite store.
  let store_path = expand_tilde(&daemon_cfg.store_path);
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  // Outbound email.
  let notifier = SmtpNotifier::new(&daemon_cfg.smtp)
    .context("failed to build SMTP notifier")?;
  let dispatcher = Arc::new(Dispatcher::new(notifier));
  let clock: Arc<dyn Clock> = Arc::new(SystemClock);

  // Background context: register and start the notification scheduler.
  let scheduler = JobScheduler::new(Arc::clone(&clock));
  let jobs = Arc::new(NotificationJobs::new(
    Arc::clone(&store),
    Arc::clone(&dispatcher),
    Arc::clone(&clock),
  ));
  jobs.register(&scheduler);
  scheduler.start();

  // Request context: the JSON API.
  let state = ApiState {
    store,
    dispatcher: Arc::clone(&dispatcher),
    clock,
  };
  let app = axum::Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", daemon_cfg.host, daemon_cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  // Normal exit: stop the job loops before leaving main.
  scheduler.shutdown();
  let counts = dispatcher.counts();
  tracing::info!(
    sent = counts.sent,
    failed = counts.failed,
    "shutting down"
  );

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
  }
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
