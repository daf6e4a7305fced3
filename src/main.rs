//! Dashboard server for run-report statistics.
//!
//! Loads a directory of JSON report documents into an in-memory store,
//! serves the aggregation API over HTTP, and periodically re-scans the
//! directory so new runs show up without a restart.
//!
//! # Usage
//!
//! ```bash
//! report-stats-viewer /data/reports
//! report-stats-viewer /data/reports --port 8080 --refresh-secs 60
//! report-stats-viewer /data/reports --no-browser
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use report_stats_viewer::server::{self, ServerConfig};
use report_stats_viewer::store::{load_report_dir, ReportStore};

/// Run-report statistics dashboard
#[derive(Parser, Debug)]
#[command(name = "report-stats-viewer")]
#[command(about = "Serve aggregated run-report statistics for charting")]
#[command(version)]
struct Args {
    /// Directory of JSON report documents (scanned recursively)
    data_dir: PathBuf,

    /// Port for the web server
    #[arg(short, long, default_value = "8060")]
    port: u16,

    /// Interval in seconds for background directory re-scans (0 to disable)
    #[arg(long, default_value = "30")]
    refresh_secs: u64,

    /// Don't open a browser automatically
    #[arg(long)]
    no_browser: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    tracing::info!(
        data_dir = %args.data_dir.display(),
        port = args.port,
        refresh_secs = args.refresh_secs,
        "Starting report-stats-viewer"
    );

    let store = load_report_dir(&args.data_dir)
        .with_context(|| format!("failed to load reports from {}", args.data_dir.display()))?;
    tracing::info!(
        reports = store.report_count(),
        samples = store.sample_count(),
        "Loaded report directory"
    );
    if store.report_count() == 0 {
        tracing::warn!(
            data_dir = %args.data_dir.display(),
            "No report documents found; serving an empty state until files appear"
        );
    }

    let store = Arc::new(store);

    // Background directory refresh: load a fresh store off to the side and
    // swap it in, so in-flight requests keep the snapshot they fetched.
    if args.refresh_secs > 0 {
        let refresh_store = Arc::clone(&store);
        let data_dir = args.data_dir.clone();
        let refresh_secs = args.refresh_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(refresh_secs));
            interval.tick().await; // Skip immediate first tick
            loop {
                interval.tick().await;
                match refresh_store.reload_from_dir(&data_dir) {
                    Ok((reports, samples)) => {
                        tracing::debug!(reports, samples, "Refreshed report directory");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Report directory refresh failed; keeping previous contents");
                    }
                }
            }
        });
        tracing::info!(refresh_secs, "Background report refresh enabled");
    }

    let config = ServerConfig {
        port: args.port,
        open_browser: !args.no_browser,
    };

    let store: Arc<dyn ReportStore> = store;
    server::run_server(store, config).await?;

    Ok(())
}
