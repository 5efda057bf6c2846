//! Sliding-window quota tracking for a single partition.
//!
//! Two caps apply at once: a short burst window and a long sustained window.
//! Timestamps are kept only while they fall inside the long window and are
//! pruned lazily on each check.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Caps enforced per partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaLimits {
    pub short_window: Duration,
    pub short_cap: usize,
    pub long_window: Duration,
    pub long_cap: usize,
}

impl Default for QuotaLimits {
    /// Personal API key limits: 20 requests per second, 100 per two minutes.
    fn default() -> Self {
        Self {
            short_window: Duration::from_secs(1),
            short_cap: 20,
            long_window: Duration::from_secs(120),
            long_cap: 100,
        }
    }
}

/// Record of recent dispatches on one partition.
#[derive(Debug)]
pub struct QuotaTracker {
    limits: QuotaLimits,
    history: VecDeque<Instant>,
}

impl QuotaTracker {
    pub fn new(limits: QuotaLimits) -> Self {
        Self {
            limits,
            history: VecDeque::new(),
        }
    }

    /// How long to wait before the next dispatch is allowed.
    ///
    /// Returns zero when a request may go out now. Otherwise the wait is
    /// computed from the short window first (against the `short_cap`-th most
    /// recent dispatch) and then the long window (against the oldest retained
    /// dispatch). The result is never negative; callers re-check after
    /// sleeping because satisfying one window may still leave the other full.
    pub fn time_until_allowed(&mut self, now: Instant) -> Duration {
        self.prune(now);

        let in_short_window = self
            .history
            .iter()
            .rev()
            .take_while(|t| now.duration_since(**t) < self.limits.short_window)
            .count();

        if in_short_window >= self.limits.short_cap {
            let anchor = self.history[self.history.len() - self.limits.short_cap];
            return self
                .limits
                .short_window
                .saturating_sub(now.duration_since(anchor));
        }

        if self.history.len() >= self.limits.long_cap {
            let anchor = self.history[self.history.len() - self.limits.long_cap];
            return self
                .limits
                .long_window
                .saturating_sub(now.duration_since(anchor));
        }

        Duration::ZERO
    }

    /// Record a dispatch at `now`. Call exactly once per network attempt.
    pub fn record_dispatch(&mut self, now: Instant) {
        self.history.push_back(now);
    }

    /// Number of dispatches still inside the long window as of the last prune.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn prune(&mut self, now: Instant) {
        while self
            .history
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.limits.long_window)
        {
            self.history.pop_front();
        }
    }
}
