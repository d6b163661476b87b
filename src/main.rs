mod api;
mod app;
mod collection;
mod commands;
mod config;
mod context;
mod event;
mod mutation;
mod notify;
mod query;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "p9s")]
#[command(about = "A terminal admin console for property marketplace backends, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/p9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Backend base URL, overriding the config file
  #[arg(short, long)]
  api_url: Option<String>,
}

/// Route log output to a daily file under the data dir. Writing to stderr
/// would scribble over the alternate screen, so the TUI never logs there.
/// The returned guard must stay alive for the worker to flush.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = config::Config::data_dir()?.join("logs");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::daily(log_dir, "p9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("p9s=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = init_tracing();

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override backend URL if specified on command line
  let config = if let Some(url) = args.api_url {
    config::Config {
      api: config::ApiConfig { base_url: url },
      ..config
    }
  } else {
    config
  };

  // Restore a persisted session if one is still valid
  let session = match config::Config::data_dir() {
    Some(dir) => {
      std::fs::create_dir_all(&dir).ok();
      session::SessionStore::new(dir.join("session.json"))
    }
    None => session::SessionStore::in_memory(),
  };
  session.restore();

  let api = api::ApiClient::new(&config.api.base_url, session.clone())?;

  let ctx = context::Ctx {
    api,
    cache: query::QueryCache::new(),
    notifier: notify::Notifier::new(),
    session,
    page_size: config.ui.page_size,
    debounce: Duration::from_millis(config.ui.search_debounce_ms),
    earnings_year: config.ui.earnings_year.clone(),
  };

  // Initialize and run the app
  let mut app = app::App::new(config, ctx);
  app.run().await?;

  Ok(())
}
