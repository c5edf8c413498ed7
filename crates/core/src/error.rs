use thiserror::Error;

/// Error taxonomy for the estimator pipeline.
///
/// Display strings on the estimator-side variants double as the wire
/// error bodies, so they must stay stable.
#[derive(Debug, Error)]
pub enum FlowError {
    /// No symbol supplied by the caller.
    #[error("Missing symbol")]
    MissingSymbol,
    /// Transport failure or non-2xx from the market-data provider.
    #[error("Failed to fetch data")]
    UpstreamUnavailable,
    /// The price series yielded zero usable log-returns.
    #[error("Insufficient data for symbol")]
    InsufficientData,
    /// Unexpected failure while decoding the upstream payload.
    #[error("Error: {0}")]
    Upstream(String),
    #[error("Invalid parameter: {0}")]
    InvalidParams(String),
    /// `start` issued while a run is in progress.
    #[error("Simulation already running")]
    AlreadyRunning,
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;

impl From<reqwest::Error> for FlowError {
    fn from(_: reqwest::Error) -> Self {
        FlowError::UpstreamUnavailable
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::Upstream(err.to_string())
    }
}
