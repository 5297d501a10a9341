//! Data models for the volatility REST API and widget selections.
//!
//! `VolSnapshot` mirrors the JSON the forecast/realized endpoints return;
//! `Selection` is the local state of the dropdown controls that pick
//! which instrument, window and metric a widget tracks.

use serde::Deserialize;
use std::collections::HashMap;

/// One volatility sample as fed to the range engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Volatility as a non-negative percentage (e.g. 42.5 for 42.5%).
    pub value: f64,
    /// Sample timestamp in epoch milliseconds.
    pub timestamp: i64,
}

/// Payload returned by the volatility endpoints.
///
/// Forecast endpoints report `horizon`, realized endpoints `window_hours`;
/// both are optional so a single model covers either shape.
#[derive(Debug, Deserialize)]
pub struct VolSnapshot {
    /// Metric name -> value, e.g. "volatility", "upside_volatility".
    pub metrics: HashMap<String, f64>,
    /// Server-side timestamp in epoch milliseconds.
    pub timestamp: i64,
    #[serde(default)]
    pub horizon: Option<f64>,
    #[serde(default)]
    pub window_hours: Option<f64>,
}

/// Which metric of the snapshot drives the gauge needle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Volatility,
    UpsideVolatility,
    DownsideVolatility,
}

impl MetricKind {
    /// Key under `metrics` in the API payload.
    pub fn api_key(&self) -> &'static str {
        match self {
            Self::Volatility => "volatility",
            Self::UpsideVolatility => "upside_volatility",
            Self::DownsideVolatility => "downside_volatility",
        }
    }

    /// Display label for the metric dropdown / status panel.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Volatility => "Volatility",
            Self::UpsideVolatility => "Upside Volatility",
            Self::DownsideVolatility => "Downside Volatility",
        }
    }
}

/// Unit of the lookback/forecast window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowUnit {
    Days,
    Hours,
}

/// What a widget is currently tracking: instrument, window and metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub instrument: String,
    pub window: u32,
    pub unit: WindowUnit,
    pub metric: MetricKind,
}

impl Selection {
    /// Human-readable window text, e.g. "7 Days".
    ///
    /// Forecast endpoints encode the window in days with 0 meaning one
    /// hour; realized endpoints encode the same choices in hours.
    pub fn window_label(&self) -> String {
        match self.unit {
            WindowUnit::Days => match self.window {
                0 => "1 Hour".to_string(),
                1 => "1 Day".to_string(),
                7 => "7 Days".to_string(),
                30 => "30 Days".to_string(),
                n => format!("{} Days", n),
            },
            WindowUnit::Hours => match self.window {
                1 => "1 Hour".to_string(),
                24 => "1 Day".to_string(),
                168 => "7 Days".to_string(),
                720 => "30 Days".to_string(),
                n => format!("{} Hours", n),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_forecast_snapshot() {
        let json = r#"{"metrics":{"volatility":42.5},"timestamp":1700000000000,"horizon":30}"#;
        let snap: VolSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.metrics["volatility"], 42.5);
        assert_eq!(snap.timestamp, 1_700_000_000_000);
        assert_eq!(snap.horizon, Some(30.0));
        assert!(snap.window_hours.is_none());
    }

    #[test]
    fn decodes_realized_snapshot_with_extra_metrics() {
        let json = r#"{
            "metrics": {"volatility": 61.2, "upside_volatility": 40.0, "downside_volatility": 55.1},
            "timestamp": 1700000000000,
            "window_hours": 24
        }"#;
        let snap: VolSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.metrics.len(), 3);
        assert_eq!(snap.window_hours, Some(24.0));
        assert!(snap.horizon.is_none());
    }

    #[test]
    fn metric_kind_maps_to_api_keys() {
        assert_eq!(MetricKind::Volatility.api_key(), "volatility");
        assert_eq!(MetricKind::UpsideVolatility.api_key(), "upside_volatility");
        assert_eq!(MetricKind::DownsideVolatility.label(), "Downside Volatility");

        let parsed: MetricKind = serde_json::from_str("\"upside_volatility\"").unwrap();
        assert_eq!(parsed, MetricKind::UpsideVolatility);
    }

    #[test]
    fn window_labels_match_selector_text() {
        let mut sel = Selection {
            instrument: "ETH".to_string(),
            window: 30,
            unit: WindowUnit::Days,
            metric: MetricKind::Volatility,
        };
        assert_eq!(sel.window_label(), "30 Days");

        sel.window = 0;
        assert_eq!(sel.window_label(), "1 Hour");

        sel.unit = WindowUnit::Hours;
        sel.window = 168;
        assert_eq!(sel.window_label(), "7 Days");

        sel.window = 48;
        assert_eq!(sel.window_label(), "48 Hours");
    }
}
