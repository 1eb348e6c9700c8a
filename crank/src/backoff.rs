//! Retry timing policies.
//!
//! Settlement retries on two schedules: a fixed interval while the
//! program says the day is not over yet, and a linearly growing,
//! capped delay for everything else. Both are expressed as a pure
//! policy so the delay math is unit-testable without sleeping.

use std::time::{Duration, Instant};

/// Delay schedule between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Same delay for every attempt.
    Fixed {
        /// Delay between attempts.
        interval: Duration,
    },

    /// Delay grows linearly with the attempt number, up to a cap.
    LinearCapped {
        /// Base delay, multiplied by the attempt number.
        interval: Duration,
        /// Upper bound on the delay.
        cap: Duration,
    },
}

impl BackoffPolicy {
    /// Returns the delay before the next attempt. Attempts are numbered
    /// from 1.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { interval } => *interval,
            Self::LinearCapped { interval, cap } => {
                interval.saturating_mul(attempt.max(1)).min(*cap)
            }
        }
    }
}

/// Wall-clock deadline for a retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryWindow {
    started: Instant,
    window: Duration,
}

impl RetryWindow {
    /// Opens a window of the given length starting now.
    #[must_use]
    pub fn open(window: Duration) -> Self {
        Self::open_at(Instant::now(), window)
    }

    /// Opens a window measured from a caller-supplied start instant.
    #[must_use]
    pub fn open_at(started: Instant, window: Duration) -> Self {
        Self { started, window }
    }

    /// Returns true once the window has elapsed.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.started.elapsed() > self.window
    }

    /// Returns the time elapsed since the window opened.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
