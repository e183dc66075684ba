use std::fmt;
use std::time::Duration;

/// Result type for rate limiting operations
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Errors that can occur during rate limiting operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitError {
    /// No permit available right now
    Exceeded,

    /// The wait for a permit was cancelled before one was granted
    Cancelled,

    /// No permit became available within the given duration
    Timeout(Duration),

    /// Invalid configuration
    InvalidConfig(&'static str),
}

impl fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitError::Exceeded => write!(f, "Rate limit exceeded"),
            RateLimitError::Cancelled => write!(f, "Permit acquisition cancelled"),
            RateLimitError::Timeout(after) => write!(f, "No permit available after {:?}", after),
            RateLimitError::InvalidConfig(msg) => write!(f, "Invalid rate limiter configuration: {}", msg),
        }
    }
}

impl std::error::Error for RateLimitError {}
