//! change-radar binary entrypoint.
//! Loads `.env`, builds `Settings` once, and runs a single polling pass
//! (or re-renders the dashboard / validates the source list).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use change_radar::config::{load_sources_from, Settings};
use change_radar::ingest::HttpFetcher;
use change_radar::metrics::MetricsExport;
use change_radar::{app, NotifierMux};

/// Poll feeds and pages, archive changes, render the dashboard, notify.
#[derive(Parser, Debug)]
#[command(name = "change-radar", version, about)]
struct Cli {
    /// Source list (TOML or JSON). Overrides MONITOR_SOURCES_PATH.
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Directory for rss_state.json / page_state.json. Overrides MONITOR_STATE_DIR.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Directory for archive.json / index.html. Overrides MONITOR_DOCS_DIR.
    #[arg(long)]
    docs_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one polling pass (default)
    Run {
        /// Skip notification delivery
        #[arg(long)]
        no_notify: bool,
    },
    /// Rebuild index.html from archive.json without polling
    Render,
    /// Validate the source list and print it
    Check,
}

/// Compact logs by default; JSON lines when MONITOR_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("change_radar=info,warn"));
    let json = std::env::var("MONITOR_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(p) = cli.sources {
        settings.sources_path = p;
    }
    if let Some(p) = cli.state_dir {
        settings.state_dir = p;
    }
    if let Some(p) = cli.docs_dir {
        settings.docs_dir = p;
    }

    match cli.command.unwrap_or(Command::Run { no_notify: false }) {
        Command::Render => {
            let path = app::render_from_archive(&settings).context("render dashboard")?;
            tracing::info!(path = %path.display(), "dashboard rendered");
        }
        Command::Check => {
            let sources = load_sources_from(&settings.sources_path)?;
            for s in &sources {
                println!("{:<24} {:<5} {}", s.id, s.kind.as_str(), s.url);
            }
            println!("{} sources OK", sources.len());
        }
        Command::Run { no_notify } => {
            // Configuration problems abort before any fetching
            let sources = load_sources_from(&settings.sources_path)
                .with_context(|| format!("loading {}", settings.sources_path.display()))?;
            let export = settings.metrics_path.clone().and_then(MetricsExport::install);

            let fetcher = HttpFetcher::new(&settings.user_agent).context("http client")?;
            let mux = if no_notify {
                NotifierMux::default()
            } else {
                NotifierMux::from_config(&settings.notify)
            };
            tracing::debug!(sinks = ?mux.sink_names(), "notification sinks");

            let summary = app::run_once(&settings, &sources, fetcher, &mux)
                .await
                .context("monitor run")?;

            if let Some(export) = export {
                if let Err(e) = export.write() {
                    tracing::warn!(
                        path = %export.path().display(),
                        error = %e,
                        "metrics export failed"
                    );
                }
            }
            println!(
                "{} new events, {} sources skipped, archive holds {}",
                summary.report.events.len(),
                summary.report.skipped(),
                summary.archive_len
            );
        }
    }
    Ok(())
}
