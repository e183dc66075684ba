//! # crpt_ratelimit
//!
//! Rolling-window request throttle with deferred permit release

pub mod error;
pub mod limiter;
pub mod permit;
mod pool;
pub mod time;

pub use error::RateLimitError;
pub use error::Result;
pub use limiter::RateLimiter;
pub use limiter::RateLimiterBuilder;
pub use permit::Permit;
pub use pool::ReleaseMode;
pub use time::TimeUnit;
pub use tokio_util::sync::CancellationToken;
