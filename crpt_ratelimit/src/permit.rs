use std::fmt;
use std::sync::Arc;

use tokio::time::Instant;

use crate::limiter::Shared;
use crate::pool::ReleaseMode;

/// Admission granted by a [`RateLimiter`](crate::RateLimiter)
///
/// Hold the permit for the duration of the guarded operation. Dropping it never
/// returns capacity immediately: with [`ReleaseMode::OnAdmission`] the release
/// was already scheduled when the permit was granted, with
/// [`ReleaseMode::OnCompletion`] the drop schedules it `window` from now. The
/// drop runs on success, error and unwinding alike, so capacity cannot leak.
#[must_use = "dropping a permit ends the guarded operation"]
pub struct Permit {
    shared: Arc<Shared>,
    admitted_at: Instant,
    release_at: Option<Instant>,
}

impl Permit {
    pub(crate) fn new(shared: Arc<Shared>, admitted_at: Instant, release_at: Option<Instant>) -> Self {
        Self { shared, admitted_at, release_at }
    }

    /// When this permit was granted
    pub fn admitted_at(&self) -> Instant {
        self.admitted_at
    }

    /// When this permit returns to the pool, if already scheduled
    pub fn release_at(&self) -> Option<Instant> {
        self.release_at
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        if self.shared.release_mode() == ReleaseMode::OnCompletion {
            self.shared.complete();
        }
    }
}

impl fmt::Debug for Permit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit").field("admitted_at", &self.admitted_at).field("release_at", &self.release_at).finish()
    }
}
