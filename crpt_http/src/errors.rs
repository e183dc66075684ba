use crpt_ratelimit::RateLimitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Rate limiter: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl HttpError {
    /// True when the caller gave up waiting for a permit
    pub fn is_cancelled(&self) -> bool {
        matches!(self, HttpError::RateLimit(RateLimitError::Cancelled))
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;
