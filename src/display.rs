//! Frame types handed to the rendering collaborator.
//!
//! The actual gauge renderer (needle, color bands, tick labels, text
//! panels) lives outside this crate; the monitor only pushes frames
//! through the `FrameSink` seam. `LogSink` stands in for it when the
//! monitor runs headless.

use chrono::{Local, TimeZone};
use tracing::{info, warn};

use crate::engine::{Classification, Range, TICK_COUNT, Zone, ZONE_COUNT};
use crate::models::Selection;

/// Needle position shown when no data is available.
pub const NEUTRAL_NEEDLE: f64 = 0.0;

/// Everything a renderer needs to redraw the gauge after one reading.
#[derive(Debug, Clone)]
pub struct GaugeFrame {
    pub value: f64,
    pub range: Range,
    pub zones: [Zone; ZONE_COUNT],
    pub ticks: [f64; TICK_COUNT],
    pub classification: Classification,
    /// Server timestamp of the reading, epoch milliseconds.
    pub timestamp: i64,
}

/// Presentation state for one refresh cycle.
#[derive(Debug, Clone)]
pub enum FrameState {
    /// A selection change is in flight; the needle parks mid-range until
    /// the first fresh reading arrives.
    Loading { needle: f64 },

    /// Fetch failed or the reading was rejected. Neutral needle, the
    /// previous range and zones stay on screen.
    Unavailable { needle: f64 },

    Live(GaugeFrame),
}

impl FrameState {
    pub fn loading(range: Range) -> Self {
        Self::Loading {
            needle: range.midpoint(),
        }
    }

    pub fn unavailable() -> Self {
        Self::Unavailable {
            needle: NEUTRAL_NEEDLE,
        }
    }
}

/// Rendering collaborator interface.
pub trait FrameSink: Send + Sync {
    fn render(&self, widget: &str, selection: &Selection, frame: &FrameState);
}

/// Renders frames as structured log lines.
pub struct LogSink;

impl FrameSink for LogSink {
    fn render(&self, widget: &str, selection: &Selection, frame: &FrameState) {
        match frame {
            FrameState::Loading { needle } => {
                info!("⏳ [{}] Loading data... (needle parked at {:.1})", widget, needle);
            }
            FrameState::Unavailable { needle } => {
                warn!("❌ [{}] Data unavailable (needle at {:.1})", widget, needle);
            }
            FrameState::Live(f) => {
                info!(
                    "📈 [{}] {} {}: {:.2}% | {} | Range: {:.0}-{:.0} | Window: {} | Last Update: {}",
                    widget,
                    selection.instrument,
                    selection.metric.label(),
                    f.value,
                    f.classification.describe(),
                    f.range.min,
                    f.range.max,
                    selection.window_label(),
                    format_timestamp(f.timestamp),
                );
            }
        }
    }
}

/// Formats an epoch-millisecond timestamp as local `HH:MM:SS`.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(t) => t.format("%H:%M:%S").to_string(),
        None => timestamp_ms.to_string(),
    }
}
