use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Currency must not be empty.")]
    EmptyCurrency,
    #[error("Invalid amount value.")]
    InvalidAmount,
    #[error("Converted amount for {0} does not fit in a decimal.")]
    Overflow(String),
    #[error("Could not obtain exchange rates. {0}")]
    Upstream(#[from] ProviderError),
}

impl ConvertError {
    /// True when the request itself was at fault, as opposed to the rate sources behind it.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Upstream(_))
    }
}

/// Failures of the rate cache. [`StoreError::NotFound`] is the ordinary cache-miss signal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No cached rates under this key")]
    NotFound,
    #[error("Rate cache database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Cached rates could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Can't request rates from the provider: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Provider answered with status {0}")]
    Status(StatusCode),
    #[error("Can't parse response from the provider: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Error marshaling JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Error marshaling XML: {0}")]
    Xml(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}
