use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Condvar;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use crate::error::RateLimitError;
use crate::error::Result;
use crate::permit::Permit;
use crate::pool::Admission;
use crate::pool::PermitPool;
use crate::pool::ReleaseMode;
use crate::time::TimeUnit;

/// Upper bound on a single blocking wait, so cancellation is observed promptly
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// State shared between a limiter, its clones and every outstanding permit
pub(crate) struct Shared {
    pool: Mutex<PermitPool>,

    /// Wakes threads parked in `acquire_blocking`
    condvar: Condvar,

    /// Wakes tasks parked in `acquire`
    notify: Notify,

    limit: u32,
    window: Duration,
    mode: ReleaseMode,
}

impl Shared {
    pub(crate) fn release_mode(&self) -> ReleaseMode {
        self.mode
    }

    /// Called when a completion-anchored permit is dropped
    pub(crate) fn complete(&self) {
        let release_at = {
            let mut pool = self.pool.lock();
            pool.complete(Instant::now())
        };

        if let Some(release_at) = release_at {
            trace!(?release_at, "operation finished, release scheduled");
        }

        // Waiters with no pending deadline need to learn about the new one
        self.notify.notify_waiters();
        self.condvar.notify_all();
    }
}

/// Rolling-window request throttle
///
/// At most `request_limit` permits are granted in any `window`-long interval.
/// Every granted permit returns to the pool exactly `window` after its anchor
/// instant (see [`ReleaseMode`]), independently of other permits. Bursts are
/// capped at `request_limit` and steady-state throughput at `request_limit`
/// per `window`.
///
/// Cloning is cheap and every clone shares the same pool. Waiters are not
/// served in FIFO order.
#[derive(Clone)]
pub struct RateLimiter {
    shared: Arc<Shared>,
}

impl RateLimiter {
    /// Create a limiter admitting `request_limit` calls per one `time_unit`
    pub fn new(time_unit: TimeUnit, request_limit: u32) -> Result<Self> {
        Self::builder().time_unit(time_unit).request_limit(request_limit).build()
    }

    /// Create a limiter with a one second window
    pub fn per_second(request_limit: u32) -> Result<Self> {
        Self::new(TimeUnit::Seconds, request_limit)
    }

    /// Create a limiter with a one minute window
    pub fn per_minute(request_limit: u32) -> Result<Self> {
        Self::new(TimeUnit::Minutes, request_limit)
    }

    pub fn builder() -> RateLimiterBuilder {
        RateLimiterBuilder::new()
    }

    fn admit(&self) -> std::result::Result<Permit, Option<Instant>> {
        let mut pool = self.shared.pool.lock();
        let now = Instant::now();

        match pool.try_admit(now) {
            Admission::Granted { release_at } => {
                let available = pool.available(now);
                drop(pool);
                debug!(available, "permit granted");
                Ok(Permit::new(Arc::clone(&self.shared), now, release_at))
            }
            Admission::Wait { until } => Err(until),
        }
    }

    /// Take a permit if one is free, without waiting
    pub fn try_acquire(&self) -> Result<Permit> {
        self.admit().map_err(|_| RateLimitError::Exceeded)
    }

    /// Wait until a permit is free, then take it
    ///
    /// Waits indefinitely. Dropping the returned future before it resolves
    /// consumes nothing.
    pub async fn acquire(&self) -> Result<Permit> {
        loop {
            // Register interest before checking, so a release between the
            // check and the wait is not missed
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let until = match self.admit() {
                Ok(permit) => return Ok(permit),
                Err(until) => until,
            };

            debug!(?until, "pool exhausted, waiting for release");

            match until {
                Some(deadline) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => {}
                        _ = &mut notified => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Like [`acquire`](Self::acquire), aborting with [`RateLimitError::Cancelled`]
    /// once `cancel` fires
    ///
    /// An already cancelled token fails immediately even if permits are free.
    pub async fn acquire_with_cancel(&self, cancel: &CancellationToken) -> Result<Permit> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("permit wait cancelled");
                Err(RateLimitError::Cancelled)
            }
            permit = self.acquire() => permit,
        }
    }

    /// Like [`acquire`](Self::acquire), giving up after `timeout`
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<Permit> {
        match tokio::time::timeout(timeout, self.acquire()).await {
            Ok(permit) => permit,
            Err(_) => Err(RateLimitError::Timeout(timeout)),
        }
    }

    /// Block the current thread until a permit is free, then take it
    ///
    /// Must not be called from within an async task. Returns
    /// [`RateLimitError::Cancelled`] once `cancel` fires.
    pub fn acquire_blocking(&self, cancel: &CancellationToken) -> Result<Permit> {
        let mut pool = self.shared.pool.lock();

        loop {
            if cancel.is_cancelled() {
                debug!("permit wait cancelled");
                return Err(RateLimitError::Cancelled);
            }

            let now = Instant::now();
            match pool.try_admit(now) {
                Admission::Granted { release_at } => {
                    let available = pool.available(now);
                    drop(pool);
                    debug!(available, "permit granted");
                    return Ok(Permit::new(Arc::clone(&self.shared), now, release_at));
                }
                Admission::Wait { until } => {
                    let poll = now + CANCEL_POLL_INTERVAL;
                    let deadline = until.map_or(poll, |until| until.min(poll));
                    self.shared.condvar.wait_until(&mut pool, deadline.into_std());
                }
            }
        }
    }

    /// Permits that could be granted right now
    pub fn available(&self) -> u32 {
        self.shared.pool.lock().available(Instant::now())
    }

    /// Permits granted whose guarded operation is still running
    ///
    /// Always zero with [`ReleaseMode::OnAdmission`].
    pub fn in_flight(&self) -> u32 {
        self.shared.pool.lock().in_flight()
    }

    /// Time until the next consumed permit returns, if any is pending
    pub fn next_release_in(&self) -> Option<Duration> {
        let now = Instant::now();
        let next = self.shared.pool.lock().next_release(now);
        next.map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn capacity(&self) -> u32 {
        self.shared.limit
    }

    pub fn window(&self) -> Duration {
        self.shared.window
    }

    pub fn release_mode(&self) -> ReleaseMode {
        self.shared.mode
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limit", &self.shared.limit)
            .field("window", &self.shared.window)
            .field("mode", &self.shared.mode)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a rate limiter
#[derive(Debug, Default)]
pub struct RateLimiterBuilder {
    request_limit: Option<u32>,
    window: Option<Duration>,
    release_mode: ReleaseMode,
}

impl RateLimiterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum admissions per window
    pub fn request_limit(mut self, request_limit: u32) -> Self {
        self.request_limit = Some(request_limit);
        self
    }

    /// Window of exactly one `time_unit`
    pub fn time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.window = Some(time_unit.as_duration());
        self
    }

    /// Arbitrary window duration
    pub fn window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    pub fn release_mode(mut self, release_mode: ReleaseMode) -> Self {
        self.release_mode = release_mode;
        self
    }

    pub fn per_second(self, request_limit: u32) -> Self {
        self.request_limit(request_limit).time_unit(TimeUnit::Seconds)
    }

    pub fn per_minute(self, request_limit: u32) -> Self {
        self.request_limit(request_limit).time_unit(TimeUnit::Minutes)
    }

    /// Build the limiter, rejecting unusable parameters up front
    pub fn build(self) -> Result<RateLimiter> {
        let limit = self.request_limit.ok_or(RateLimitError::InvalidConfig("request limit must be set"))?;
        let window = self.window.ok_or(RateLimitError::InvalidConfig("window must be set"))?;

        if limit == 0 {
            return Err(RateLimitError::InvalidConfig("request limit must be greater than 0"));
        }
        if window.is_zero() {
            return Err(RateLimitError::InvalidConfig("window duration must be greater than 0"));
        }
        if Instant::now().checked_add(window).is_none() {
            return Err(RateLimitError::InvalidConfig("window duration is too large"));
        }

        let shared = Shared {
            pool: Mutex::new(PermitPool::new(limit, window, self.release_mode)),
            condvar: Condvar::new(),
            notify: Notify::new(),
            limit,
            window,
            mode: self.release_mode,
        };

        Ok(RateLimiter { shared: Arc::new(shared) })
    }
}
