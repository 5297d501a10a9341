use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use gauge_monitor::client::HttpVolatilitySource;
use gauge_monitor::config::MonitorConfig;
use gauge_monitor::display::LogSink;
use gauge_monitor::poller::WidgetHandle;

/// Custom timer implementation to format log timestamps using the system's local timezone.
/// By default, tracing uses UTC (Zulu time), which can be confusing for local debugging.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

#[tokio::main]
async fn main() {
    // Initialize the tracing subscriber.
    // 1. Reads the log level from the RUST_LOG environment variable (defaults to "info").
    // 2. Injects the custom LocalTimer to ensure logs show local time.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(LocalTimer)
        .init();

    // Load configuration immediately at startup.
    // Adopts a "Fail Fast" strategy: if the config is missing or invalid, exit immediately.
    let cfg = match MonitorConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("❌ Critical Error: Failed to load configuration: {}", e);
            return;
        }
    };

    let period = cfg.poll_period();
    let sink = Arc::new(LogSink);

    let mut widgets: Vec<WidgetHandle> = cfg
        .widgets
        .into_iter()
        .map(|w| {
            let source = Arc::new(HttpVolatilitySource::new(w.url_template.clone()));
            WidgetHandle::spawn(w, period, source, sink.clone())
        })
        .collect();

    info!("🚀 Volatility gauge monitor running ({} widgets)", widgets.len());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("❌ Failed to listen for shutdown signal: {}", e);
    }

    // Clear every pending refresh before exiting.
    for widget in &mut widgets {
        widget.stop();
    }
    info!("👋 Shutdown complete.");
}
