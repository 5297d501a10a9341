use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, GaugeError>;

/// Errors surfaced by the gauge monitor.
#[derive(Error, Debug)]
pub enum GaugeError {
    /// Reading was negative or non-finite. The range is left untouched.
    #[error("invalid reading value: {0}")]
    InvalidReading(f64),

    /// A display range must satisfy min < max.
    #[error("invalid range: min {min} must be below max {max}")]
    InvalidRange { min: f64, max: f64 },

    /// The configured metric key is absent from the API payload.
    #[error("metric '{0}' missing from response")]
    MetricMissing(String),

    /// The endpoint answered with a non-2xx status.
    #[error("API returned HTTP status {0}")]
    Api(u16),

    /// Transport or decode failure in the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration file missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}
