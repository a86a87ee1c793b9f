//! When and how long to wait before fetching a catalog record again.

use crate::catalog::SourceError;
use std::time::Duration;

/// Wait between catalog fetch attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Immediate,
    Fixed(Duration),
    /// Starts at `first` and doubles per retry, never exceeding `ceiling`.
    Doubling { first: Duration, ceiling: Duration },
}

impl Backoff {
    /// Wait before retry number `retry` (0 for the first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Immediate => Duration::ZERO,
            Backoff::Fixed(delay) => delay,
            Backoff::Doubling { first, ceiling } => first
                .checked_mul(2u32.saturating_pow(retry))
                .map_or(ceiling, |d| d.min(ceiling)),
        }
    }
}

/// How many times a failed catalog fetch is repeated, and how far apart.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Fetches allowed after the first one.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Backoff) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Fail on the first error.
    pub fn never() -> Self {
        Self::new(0, Backoff::Immediate)
    }

    /// Whether `error` is worth another fetch once `retries` have been spent.
    ///
    /// Malformed records and client errors fail the same way every time.
    pub fn should_retry(&self, error: &SourceError, retries: u32) -> bool {
        error.is_transient() && retries < self.max_retries
    }

    /// The wait before the next fetch, or `None` when `error` ends the load.
    pub fn next_delay(&self, error: &SourceError, retries: u32) -> Option<Duration> {
        self.should_retry(error, retries)
            .then(|| self.backoff.delay(retries))
    }
}
