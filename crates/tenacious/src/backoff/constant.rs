// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use super::{Backoff, jitter};
use crate::Rnd;

/// Waits the same amount of time before every retry, plus optional random jitter.
///
/// For attempt `n ≥ 1` the delay is `wait + jitter`, where `jitter` is uniformly distributed in
/// `[0, max_jitter]`. Attempt `0` always yields a zero delay.
///
/// **Example with `100ms` wait and no jitter:** `0, 100ms, 100ms, 100ms, ...`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tenacious::{Backoff, ConstantBackoff};
///
/// let backoff = ConstantBackoff::new(Duration::from_millis(100), Duration::from_millis(50));
///
/// let delay = backoff.next_delay(3);
/// assert!(delay >= Duration::from_millis(100));
/// assert!(delay <= Duration::from_millis(150));
/// ```
#[derive(Debug, Clone)]
pub struct ConstantBackoff {
    wait: Duration,
    max_jitter: Duration,
    rnd: Rnd,
}

impl ConstantBackoff {
    /// Creates a constant backoff that waits `wait` plus up to `max_jitter` between attempts.
    #[must_use]
    pub fn new(wait: Duration, max_jitter: Duration) -> Self {
        Self {
            wait,
            max_jitter,
            rnd: Rnd::default(),
        }
    }

    /// Replaces the random source used for jitter.
    #[must_use]
    pub fn with_rnd(mut self, rnd: Rnd) -> Self {
        self.rnd = rnd;
        self
    }

    /// Returns the fixed part of the delay.
    #[must_use]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Returns the upper bound of the random jitter.
    #[must_use]
    pub fn max_jitter(&self) -> Duration {
        self.max_jitter
    }
}

impl Backoff for ConstantBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        self.wait.saturating_add(jitter(self.max_jitter, &self.rnd))
    }
}
