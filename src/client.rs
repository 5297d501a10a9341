//! HTTP source for volatility readings.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{GaugeError, Result};
use crate::models::{Reading, Selection, VolSnapshot};

/// Where readings come from. The polling cycle only sees this trait, so
/// tests can script a source without a server.
#[async_trait]
pub trait VolatilitySource: Send + Sync {
    async fn fetch(&self, selection: &Selection) -> Result<Reading>;
}

/// Fetches readings from the volatility REST API.
pub struct HttpVolatilitySource {
    http: reqwest::Client,
    url_template: String,
}

impl HttpVolatilitySource {
    pub fn new(url_template: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url_template,
        }
    }

    /// Substitutes `{CRYPTO}` and `{WINDOW}` into the endpoint template.
    pub fn build_url(&self, selection: &Selection) -> String {
        self.url_template
            .replace("{CRYPTO}", &selection.instrument)
            .replace("{WINDOW}", &selection.window.to_string())
    }
}

#[async_trait]
impl VolatilitySource for HttpVolatilitySource {
    async fn fetch(&self, selection: &Selection) -> Result<Reading> {
        let url = self.build_url(selection);
        debug!("Fetching volatility data from {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GaugeError::Api(status.as_u16()));
        }

        let snapshot: VolSnapshot = response.json().await?;
        reading_from_snapshot(&snapshot, selection)
    }
}

/// Picks the selected metric out of a decoded snapshot.
pub fn reading_from_snapshot(snapshot: &VolSnapshot, selection: &Selection) -> Result<Reading> {
    let key = selection.metric.api_key();
    let value = *snapshot
        .metrics
        .get(key)
        .ok_or_else(|| GaugeError::MetricMissing(key.to_string()))?;

    // The server echoes its own window; the displayed label still comes
    // from the local selection.
    if let Some(horizon) = snapshot.horizon {
        debug!("Snapshot horizon: {} days", horizon);
    }
    if let Some(hours) = snapshot.window_hours {
        debug!("Snapshot window: {}h", hours);
    }

    Ok(Reading {
        value,
        timestamp: snapshot.timestamp,
    })
}
