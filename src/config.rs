use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::error::{GaugeError, Result};
use crate::models::{MetricKind, Selection, WindowUnit};

/// Default display bounds a widget starts from (and resets to on a
/// selection change).
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

/// One gauge widget. The forecast and realized dashboards differ only in
/// the endpoint template, the window unit and the metric key, so both are
/// instances of this.
#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub name: String,

    /// Endpoint template with `{CRYPTO}` and `{WINDOW}` placeholders,
    /// e.g. "http://host:5001/api/vol_forecast/{CRYPTO}/{WINDOW}".
    pub url_template: String,

    pub instrument: String,
    pub window: u32,
    pub unit: WindowUnit,

    #[serde(default = "default_metric")]
    pub metric: MetricKind,

    pub range: RangeConfig,
}

impl WidgetConfig {
    /// Initial selection derived from the configured defaults.
    pub fn selection(&self) -> Selection {
        Selection {
            instrument: self.instrument.clone(),
            window: self.window,
            unit: self.unit,
            metric: self.metric,
        }
    }
}

fn default_metric() -> MetricKind {
    MetricKind::Volatility
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Polling period in seconds.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,

    pub widgets: Vec<WidgetConfig>,
}

fn default_poll_secs() -> u64 {
    10
}

impl MonitorConfig {
    /// Loads configuration from the 'config.yaml' file in the current working directory.
    pub fn load() -> Result<Self> {
        let yaml_content = fs::read_to_string("config.yaml").map_err(|_| {
            GaugeError::Config(
                "failed to read config.yaml, make sure the file exists in the root directory".into(),
            )
        })?;
        Self::from_yaml(&yaml_content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: MonitorConfig = serde_yaml::from_str(yaml)
            .map_err(|e| GaugeError::Config(format!("failed to parse config.yaml: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.widgets.is_empty() {
            return Err(GaugeError::Config("no widgets configured".into()));
        }
        for w in &self.widgets {
            if !w.url_template.contains("{CRYPTO}") {
                return Err(GaugeError::Config(format!(
                    "widget '{}': url_template must contain the {{CRYPTO}} placeholder",
                    w.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
poll_secs: 10
widgets:
  - name: forecast
    url_template: "http://192.168.70.10:5001/api/vol_forecast/{CRYPTO}/{WINDOW}"
    instrument: ETH
    window: 30
    unit: days
    metric: volatility
    range: { min: 0.0, max: 140.0 }
  - name: realized
    url_template: "http://192.168.70.10:5001/api/vol_realized/{CRYPTO}/{WINDOW}"
    instrument: ETH
    window: 24
    unit: hours
    range: { min: 0.0, max: 140.0 }
"#;

    #[test]
    fn parses_sample_config() {
        let cfg = MonitorConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(cfg.poll_secs, 10);
        assert_eq!(cfg.widgets.len(), 2);

        let realized = &cfg.widgets[1];
        assert_eq!(realized.unit, WindowUnit::Hours);
        // Metric defaults to plain volatility when omitted.
        assert_eq!(realized.metric, MetricKind::Volatility);
        assert_eq!(realized.range.max, 140.0);
    }

    #[test]
    fn poll_secs_defaults_to_ten() {
        let yaml = r#"
widgets:
  - name: forecast
    url_template: "http://host/api/vol_forecast/{CRYPTO}/{WINDOW}"
    instrument: BTC
    window: 7
    unit: days
    range: { min: 0.0, max: 140.0 }
"#;
        let cfg = MonitorConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.poll_period(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_empty_widget_list() {
        let err = MonitorConfig::from_yaml("widgets: []").unwrap_err();
        assert!(matches!(err, GaugeError::Config(_)));
    }

    #[test]
    fn rejects_template_without_crypto_placeholder() {
        let yaml = r#"
widgets:
  - name: forecast
    url_template: "http://host/api/vol_forecast/ETH/30"
    instrument: ETH
    window: 30
    unit: days
    range: { min: 0.0, max: 140.0 }
"#;
        let err = MonitorConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("{CRYPTO}"));
    }

    #[test]
    fn widget_selection_carries_defaults() {
        let cfg = MonitorConfig::from_yaml(SAMPLE).unwrap();
        let sel = cfg.widgets[0].selection();
        assert_eq!(sel.instrument, "ETH");
        assert_eq!(sel.window, 30);
        assert_eq!(sel.window_label(), "30 Days");
    }
}
