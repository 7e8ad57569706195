//! Per-store request pacing and rate-limit backoff.
//!
//! Both types take `now` explicitly so the arithmetic can be tested without
//! sleeping. Callers pass `tokio::time::Instant::now()`.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Upper bound on a single backoff window, in seconds.
pub const MAX_BACKOFF_SECS: u64 = 300;

/// Base of the exponential backoff schedule, in seconds.
const BACKOFF_BASE_SECS: u64 = 10;

/// Length of the sliding request window.
const WINDOW: Duration = Duration::from_secs(60);

/// Backoff for a store that has failed `consecutive_errors` times in a row:
/// `min(300, 10 * 2^n)` seconds.
///
/// | n | delay |
/// |---|-------|
/// | 0 | 10 s |
/// | 1 | 20 s |
/// | 2 | 40 s |
/// | 3 | 80 s |
/// | 4 | 160 s |
/// | 5+ | 300 s |
#[must_use]
pub fn backoff_delay_secs(consecutive_errors: u32) -> u64 {
    // 2^6 * 10 already exceeds the cap, so larger shifts never matter
    let factor = 1u64 << consecutive_errors.min(6);
    BACKOFF_BASE_SECS.saturating_mul(factor).min(MAX_BACKOFF_SECS)
}

/// Consecutive-error counter plus the end of the current backoff window.
#[derive(Debug, Default, Clone)]
pub struct Backoff {
    consecutive_errors: u32,
    until: Option<Instant>,
}

impl Backoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Time left in the backoff window, or `None` when requests may proceed.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    /// Opens a backoff window sized by the current error streak, then extends
    /// the streak. Returns the window length in seconds.
    pub fn trigger(&mut self, now: Instant) -> u64 {
        let delay = backoff_delay_secs(self.consecutive_errors);
        self.until = Some(now + Duration::from_secs(delay));
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        delay
    }

    /// Extends the error streak without opening a window.
    pub fn record_failure(&mut self) {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
    }

    /// Clears the streak after a successful cycle. An open window is left to
    /// expire on its own.
    pub fn reset(&mut self) {
        self.consecutive_errors = 0;
    }
}

/// Minimum spacing between cycles plus an optional requests-per-minute
/// budget tracked over a 60 second sliding window.
#[derive(Debug, Clone)]
pub struct RequestPacer {
    min_interval: Duration,
    per_minute: Option<u32>,
    recent: VecDeque<Instant>,
    last_request: Option<Instant>,
}

impl RequestPacer {
    #[must_use]
    pub fn new(min_interval: Duration, per_minute: Option<u32>) -> Self {
        Self {
            min_interval,
            per_minute: per_minute.filter(|n| *n > 0),
            recent: VecDeque::new(),
            last_request: None,
        }
    }

    /// How long to wait before the next cycle may start.
    pub fn delay_before_next(&mut self, now: Instant) -> Duration {
        self.prune(now);

        // intervals may exceed the window, so spacing never reads `recent`
        let spacing = self
            .last_request
            .map(|last| self.min_interval.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or_default();

        let budget = match (self.per_minute, self.recent.front()) {
            (Some(limit), Some(oldest)) if self.recent.len() >= limit as usize => {
                (*oldest + WINDOW).saturating_duration_since(now)
            }
            _ => Duration::ZERO,
        };

        spacing.max(budget)
    }

    /// Records a request sent at `now`.
    pub fn record(&mut self, now: Instant) {
        self.recent.push_back(now);
        self.last_request = Some(now);
        self.prune(now);
    }

    /// Requests sent within the last 60 seconds.
    #[must_use]
    pub fn in_window(&self) -> usize {
        self.recent.len()
    }

    fn prune(&mut self, now: Instant) {
        while self
            .recent
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= WINDOW)
        {
            self.recent.pop_front();
        }
    }
}
