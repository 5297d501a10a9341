// src/lib.rs

pub mod client;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod poller;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::client::VolatilitySource;
use crate::config::WidgetConfig;
use crate::display::{FrameSink, FrameState, GaugeFrame};
use crate::engine::VolatilityRangeEngine;
use crate::error::Result;
use crate::models::Selection;

/// Main polling loop for one gauge widget.
///
/// Owns the engine and the current selection. Each cycle fetches one
/// reading, feeds it to the engine and pushes a frame to the sink; the
/// fixed-period timer is re-armed only after the fetch settles, so at most
/// one fetch is logically in flight per widget. A selection change
/// received while waiting cancels the pending cycle, resets the range to
/// the widget's default and fetches immediately.
pub async fn run_widget(
    cfg: WidgetConfig,
    period: Duration,
    source: Arc<dyn VolatilitySource>,
    sink: Arc<dyn FrameSink>,
    mut commands: mpsc::Receiver<Selection>,
) -> Result<()> {
    let mut engine = VolatilityRangeEngine::new(cfg.range.min, cfg.range.max)?;
    let mut selection = cfg.selection();
    let mut commands_closed = false;

    info!(
        "🚀 [{}] Widget started ({} {}, every {:?})",
        cfg.name,
        selection.instrument,
        selection.metric.label(),
        period
    );

    loop {
        refresh_once(&cfg.name, &*source, &*sink, &mut engine, &selection).await;

        tokio::select! {
            _ = sleep(period) => {}
            cmd = commands.recv(), if !commands_closed => {
                match cmd {
                    Some(new_selection) => {
                        info!(
                            "🔄 [{}] Selection changed: {} {} ({})",
                            cfg.name,
                            new_selection.instrument,
                            new_selection.metric.label(),
                            new_selection.window_label()
                        );
                        engine.reset(cfg.range.min, cfg.range.max)?;
                        sink.render(&cfg.name, &new_selection, &FrameState::loading(engine.range()));
                        selection = new_selection;
                        // Fall through to an immediate fetch.
                    }
                    None => {
                        // Handle dropped; keep polling on schedule.
                        commands_closed = true;
                        sleep(period).await;
                    }
                }
            }
        }
    }
}

/// One fetch -> ingest -> render cycle.
///
/// Failures are absorbed here so the polling loop survives them: the sink
/// gets an `Unavailable` frame and the engine keeps its current range.
async fn refresh_once(
    widget: &str,
    source: &dyn VolatilitySource,
    sink: &dyn FrameSink,
    engine: &mut VolatilityRangeEngine,
    selection: &Selection,
) {
    let reading = match source.fetch(selection).await {
        Ok(r) => r,
        Err(e) => {
            warn!("⚠️ [{}] Fetch failed: {}", widget, e);
            sink.render(widget, selection, &FrameState::unavailable());
            return;
        }
    };

    match engine.ingest(&reading) {
        Ok(outcome) => {
            if outcome.range_changed {
                info!(
                    "📐 [{}] Range widened to {:.0}-{:.0}",
                    widget, outcome.range.min, outcome.range.max
                );
            }
            debug!(
                "[{}] Reading {:.2} -> {:?}",
                widget, reading.value, outcome.classification
            );
            sink.render(
                widget,
                selection,
                &FrameState::Live(GaugeFrame {
                    value: reading.value,
                    range: outcome.range,
                    zones: outcome.zones,
                    ticks: outcome.ticks,
                    classification: outcome.classification,
                    timestamp: reading.timestamp,
                }),
            );
        }
        Err(e) => {
            warn!("⚠️ [{}] Rejected reading: {}", widget, e);
            sink.render(widget, selection, &FrameState::unavailable());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RangeConfig;
    use crate::engine::{Classification, Range};
    use crate::error::GaugeError;
    use crate::models::{MetricKind, Reading, WindowUnit};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedSource {
        responses: Mutex<Vec<Result<Reading>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Reading>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl VolatilitySource for ScriptedSource {
        async fn fetch(&self, _selection: &Selection) -> Result<Reading> {
            self.responses.lock().unwrap().remove(0)
        }
    }

    struct CountingSource {
        hits: AtomicUsize,
    }

    #[async_trait]
    impl VolatilitySource for CountingSource {
        async fn fetch(&self, _selection: &Selection) -> Result<Reading> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(Reading {
                value: 42.0,
                timestamp: 1_700_000_000_000,
            })
        }
    }

    #[derive(Default)]
    struct CaptureSink {
        frames: Mutex<Vec<FrameState>>,
    }

    impl FrameSink for CaptureSink {
        fn render(&self, _widget: &str, _selection: &Selection, frame: &FrameState) {
            self.frames.lock().unwrap().push(frame.clone());
        }
    }

    fn widget_cfg() -> WidgetConfig {
        WidgetConfig {
            name: "forecast".to_string(),
            url_template: "http://host/api/vol_forecast/{CRYPTO}/{WINDOW}".to_string(),
            instrument: "ETH".to_string(),
            window: 30,
            unit: WindowUnit::Days,
            metric: MetricKind::Volatility,
            range: RangeConfig { min: 0.0, max: 140.0 },
        }
    }

    fn selection() -> Selection {
        widget_cfg().selection()
    }

    #[tokio::test]
    async fn successful_refresh_renders_live_frame() {
        let mut engine = VolatilityRangeEngine::new(0.0, 140.0).unwrap();
        let source = ScriptedSource::new(vec![Ok(Reading {
            value: 30.0,
            timestamp: 1_700_000_000_000,
        })]);
        let sink = CaptureSink::default();

        refresh_once("forecast", &source, &sink, &mut engine, &selection()).await;

        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            FrameState::Live(f) => {
                assert_eq!(f.value, 30.0);
                assert_eq!(f.classification, Classification::Low);
                assert_eq!(f.range, Range { min: 0.0, max: 140.0 });
            }
            other => panic!("expected live frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_fetch_reports_unavailable_and_keeps_range() {
        let mut engine = VolatilityRangeEngine::new(0.0, 140.0).unwrap();
        engine
            .ingest(&Reading {
                value: 200.0,
                timestamp: 0,
            })
            .unwrap();

        let source = ScriptedSource::new(vec![Err(GaugeError::Api(503))]);
        let sink = CaptureSink::default();

        refresh_once("forecast", &source, &sink, &mut engine, &selection()).await;

        let frames = sink.frames.lock().unwrap();
        assert!(matches!(frames[0], FrameState::Unavailable { needle } if needle == 0.0));
        // The widened range survives the outage.
        assert_eq!(engine.range(), Range { min: 0.0, max: 240.0 });
    }

    #[tokio::test]
    async fn rejected_reading_is_treated_like_a_fetch_failure() {
        let mut engine = VolatilityRangeEngine::new(0.0, 140.0).unwrap();
        let source = ScriptedSource::new(vec![Ok(Reading {
            value: -5.0,
            timestamp: 0,
        })]);
        let sink = CaptureSink::default();

        refresh_once("forecast", &source, &sink, &mut engine, &selection()).await;

        let frames = sink.frames.lock().unwrap();
        assert!(matches!(frames[0], FrameState::Unavailable { .. }));
        assert_eq!(engine.range(), Range { min: 0.0, max: 140.0 });
    }

    #[tokio::test(start_paused = true)]
    async fn selection_change_renders_loading_and_refetches() {
        let source = Arc::new(CountingSource {
            hits: AtomicUsize::new(0),
        });
        let sink = Arc::new(CaptureSink::default());
        let (tx, rx) = mpsc::channel(4);

        let widget = tokio::spawn(run_widget(
            widget_cfg(),
            Duration::from_secs(10),
            source.clone(),
            sink.clone(),
            rx,
        ));

        // Let the first cycle run; the loop is now waiting on its timer.
        tokio::task::yield_now().await;
        assert!(source.hits.load(Ordering::SeqCst) >= 1);
        let before = source.hits.load(Ordering::SeqCst);

        tx.send(Selection {
            instrument: "BTC".to_string(),
            window: 7,
            unit: WindowUnit::Days,
            metric: MetricKind::Volatility,
        })
        .await
        .unwrap();

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        // The pending timer was cancelled in favour of an immediate fetch.
        assert!(source.hits.load(Ordering::SeqCst) > before);
        let saw_loading = sink
            .frames
            .lock()
            .unwrap()
            .iter()
            .any(|f| matches!(f, FrameState::Loading { needle } if *needle == 70.0));
        assert!(saw_loading);

        widget.abort();
    }
}
