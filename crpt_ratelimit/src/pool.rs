use std::collections::VecDeque;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tokio::time::Instant;

/// Instant from which a consumed permit's window is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMode {
    /// The permit returns `window` after it was granted
    #[default]
    OnAdmission,

    /// The permit returns `window` after the guarded operation finished
    ///
    /// Slow operations stretch the effective window.
    OnCompletion,
}

/// Outcome of a single admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// A permit was consumed. `release_at` is known only when anchored at admission.
    Granted { release_at: Option<Instant> },

    /// Pool exhausted. `until` is the next deadline at which a permit returns,
    /// `None` when every held permit is still in flight.
    Wait { until: Option<Instant> },
}

/// Bounded permit pool with deferred release
///
/// Consumed permits are recorded as release deadlines in a FIFO. A permit is
/// back in the pool once its deadline is `<= now`; nothing needs to fire for
/// that to happen. Deadlines are pushed with a non-decreasing `now`, so the
/// front of the queue is always the earliest.
#[derive(Debug)]
pub(crate) struct PermitPool {
    limit: u32,
    window: Duration,
    mode: ReleaseMode,
    pending: VecDeque<Instant>,
    in_flight: u32,
}

impl PermitPool {
    pub fn new(limit: u32, window: Duration, mode: ReleaseMode) -> Self {
        Self { limit, window, mode, pending: VecDeque::with_capacity(limit.min(1024) as usize), in_flight: 0 }
    }

    #[inline]
    fn expire(&mut self, now: Instant) {
        while let Some(&deadline) = self.pending.front() {
            if deadline > now {
                break;
            }
            self.pending.pop_front();
        }
    }

    /// Permits not currently available: in flight plus awaiting release
    #[inline]
    fn held(&self) -> u32 {
        self.in_flight + self.pending.len() as u32
    }

    pub fn available(&mut self, now: Instant) -> u32 {
        self.expire(now);
        self.limit.saturating_sub(self.held())
    }

    pub fn in_flight(&self) -> u32 {
        self.in_flight
    }

    /// Earliest deadline still pending
    pub fn next_release(&mut self, now: Instant) -> Option<Instant> {
        self.expire(now);
        self.pending.front().copied()
    }

    pub fn try_admit(&mut self, now: Instant) -> Admission {
        self.expire(now);

        if self.held() >= self.limit {
            return Admission::Wait { until: self.pending.front().copied() };
        }

        match self.mode {
            ReleaseMode::OnAdmission => {
                let release_at = now + self.window;
                self.pending.push_back(release_at);
                Admission::Granted { release_at: Some(release_at) }
            }
            ReleaseMode::OnCompletion => {
                self.in_flight += 1;
                Admission::Granted { release_at: None }
            }
        }
    }

    /// Record the end of an in-flight operation and schedule its release
    pub fn complete(&mut self, now: Instant) -> Option<Instant> {
        if self.in_flight == 0 {
            return None;
        }

        self.in_flight -= 1;
        let release_at = now + self.window;
        self.pending.push_back(release_at);
        Some(release_at)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn test_admits_up_to_limit() {
        let now = Instant::now();
        let mut pool = PermitPool::new(3, WINDOW, ReleaseMode::OnAdmission);

        for _ in 0..3 {
            assert!(matches!(pool.try_admit(now), Admission::Granted { release_at: Some(_) }));
        }
        assert_eq!(pool.available(now), 0);
        assert_eq!(pool.try_admit(now), Admission::Wait { until: Some(now + WINDOW) });
    }

    #[test]
    fn test_release_exactly_after_window() {
        let start = Instant::now();
        let mut pool = PermitPool::new(1, WINDOW, ReleaseMode::OnAdmission);

        assert!(matches!(pool.try_admit(start), Admission::Granted { .. }));
        assert_eq!(pool.available(start + WINDOW - Duration::from_nanos(1)), 0);
        assert_eq!(pool.available(start + WINDOW), 1);
    }

    #[test]
    fn test_permits_return_independently() {
        let start = Instant::now();
        let mut pool = PermitPool::new(2, WINDOW, ReleaseMode::OnAdmission);

        pool.try_admit(start);
        pool.try_admit(start + Duration::from_millis(40));

        assert_eq!(pool.available(start + Duration::from_millis(99)), 0);
        assert_eq!(pool.available(start + Duration::from_millis(100)), 1);
        assert_eq!(pool.available(start + Duration::from_millis(140)), 2);
    }

    #[test]
    fn test_completion_mode_holds_until_done() {
        let start = Instant::now();
        let mut pool = PermitPool::new(1, WINDOW, ReleaseMode::OnCompletion);

        assert_eq!(pool.try_admit(start), Admission::Granted { release_at: None });
        assert_eq!(pool.in_flight(), 1);

        // Still running long after the window: nothing to wait on yet
        let later = start + Duration::from_secs(5);
        assert_eq!(pool.try_admit(later), Admission::Wait { until: None });

        assert_eq!(pool.complete(later), Some(later + WINDOW));
        assert_eq!(pool.in_flight(), 0);
        assert_eq!(pool.available(later), 0);
        assert_eq!(pool.next_release(later), Some(later + WINDOW));
        assert_eq!(pool.available(later + WINDOW), 1);
    }

    #[test]
    fn test_complete_without_in_flight_is_ignored() {
        let now = Instant::now();
        let mut pool = PermitPool::new(2, WINDOW, ReleaseMode::OnCompletion);

        assert_eq!(pool.complete(now), None);
        assert_eq!(pool.available(now), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Admit,
        Complete,
        Advance(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => Just(Op::Admit),
            2 => Just(Op::Complete),
            3 => (0u64..150).prop_map(Op::Advance),
        ]
    }

    fn mode_strategy() -> impl Strategy<Value = ReleaseMode> {
        prop_oneof![Just(ReleaseMode::OnAdmission), Just(ReleaseMode::OnCompletion)]
    }

    proptest! {
        #[test]
        fn prop_available_stays_in_bounds(limit in 1u32..8, mode in mode_strategy(), ops in prop::collection::vec(op_strategy(), 1..200)) {
            let start = Instant::now();
            let mut now = start;
            let mut pool = PermitPool::new(limit, WINDOW, mode);
            let mut admissions: Vec<Instant> = Vec::new();

            for op in ops {
                match op {
                    Op::Admit => {
                        if let Admission::Granted { .. } = pool.try_admit(now) {
                            admissions.push(now);
                        }
                    }
                    Op::Complete => {
                        pool.complete(now);
                    }
                    Op::Advance(ms) => now += Duration::from_millis(ms),
                }

                let available = pool.available(now);
                prop_assert!(available <= limit);
                prop_assert!(pool.in_flight() <= limit);

                // No rolling window ever holds more than `limit` admissions
                let recent = admissions.iter().filter(|&&at| at + WINDOW > now).count();
                prop_assert!(recent as u32 <= limit);
            }
        }
    }
}
