// Request-fatal error taxonomy. Every kind aborts the in-flight request;
// empty inputs are not errors and degrade to empty results.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or incomplete request descriptor (bad mode/unit/category,
    /// missing continuation timestamps, zero-amount range).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An emitted sample name matched no sensor catalog entry.
    #[error("unknown sensor: {0}")]
    UnknownSensor(String),

    /// Sensor catalog carried a bucketing strategy this engine does not know.
    #[error("unknown bucketing strategy: {0}")]
    UnknownBucketingStrategy(String),

    /// The raw sample store failed mid-fetch.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[source] anyhow::Error),
}

impl EngineError {
    /// Stable machine-readable kind, exposed on the wire alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidRequest(_) => "invalid_request",
            EngineError::UnknownSensor(_) => "unknown_sensor",
            EngineError::UnknownBucketingStrategy(_) => "unknown_bucketing_strategy",
            EngineError::UpstreamFetch(_) => "upstream_fetch_failure",
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(e: sqlx::Error) -> Self {
        EngineError::UpstreamFetch(e.into())
    }
}
