// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use super::{Backoff, jitter, nanos_to_duration, secs_to_duration_checked};
use crate::Rnd;

/// The default growth factor: each attempt doubles the delay.
const DEFAULT_FACTOR: f64 = 2.0;

/// Grows the delay exponentially between retries, with random jitter and an upper cap.
///
/// For attempt `n ≥ 1` the delay is `min(min_wait × factor^(n−1) + jitter, max_wait)`, where
/// `jitter` is uniformly distributed in `[0, max_jitter]` and `factor` defaults to `2`. Attempt
/// `0` always yields a zero delay.
///
/// Whole factors (including the default) grow in integer nanoseconds, so delays without jitter are
/// exact. Fractional factors grow in floating point. In both cases, when the uncapped delay is not
/// representable as a [`Duration`], `max_wait` is returned as is. Once the cap is reached the
/// delay is exactly `max_wait`, jitter never pushes it further.
///
/// **Example with `2ms` min wait, `10ms` max wait and no jitter:** `0, 2ms, 4ms, 8ms, 10ms, 10ms, ...`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tenacious::{Backoff, ExponentialBackoff};
///
/// let backoff = ExponentialBackoff::new(Duration::from_millis(2), Duration::from_millis(10), Duration::ZERO);
///
/// assert_eq!(backoff.next_delay(1), Duration::from_millis(2));
/// assert_eq!(backoff.next_delay(2), Duration::from_millis(4));
/// assert_eq!(backoff.next_delay(3), Duration::from_millis(8));
/// assert_eq!(backoff.next_delay(4), Duration::from_millis(10));
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    min_wait: Duration,
    max_wait: Duration,
    max_jitter: Duration,
    factor: f64,
    whole_factor: Option<u32>,
    rnd: Rnd,
}

impl ExponentialBackoff {
    /// Creates an exponential backoff doubling from `min_wait`, capped at `max_wait`.
    #[must_use]
    pub fn new(min_wait: Duration, max_wait: Duration, max_jitter: Duration) -> Self {
        Self {
            min_wait,
            max_wait,
            max_jitter,
            factor: DEFAULT_FACTOR,
            whole_factor: whole_factor(DEFAULT_FACTOR),
            rnd: Rnd::default(),
        }
    }

    /// Sets the growth factor applied per attempt.
    ///
    /// Factors below `1.0` (and `NaN`) are treated as `1.0`, so delays never shrink.
    ///
    /// **Default**: `2.0`
    #[must_use]
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = if factor.is_nan() || factor < 1.0 { 1.0 } else { factor };
        self.whole_factor = whole_factor(self.factor);
        self
    }

    /// Replaces the random source used for jitter.
    #[must_use]
    pub fn with_rnd(mut self, rnd: Rnd) -> Self {
        self.rnd = rnd;
        self
    }

    /// Returns the delay used for the first retry, before jitter.
    #[must_use]
    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    /// Returns the cap applied to every delay.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Returns the upper bound of the random jitter.
    #[must_use]
    pub fn max_jitter(&self) -> Duration {
        self.max_jitter
    }

    /// Returns the growth factor.
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl Backoff for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let Some(raw) = self.grow(attempt - 1) else {
            return self.max_wait;
        };

        raw.checked_add(jitter(self.max_jitter, &self.rnd))
            .map_or(self.max_wait, |delay| delay.min(self.max_wait))
    }
}

impl ExponentialBackoff {
    /// Returns `min_wait × factor^exponent`, or [`None`] when it does not fit a [`Duration`].
    fn grow(&self, exponent: u32) -> Option<Duration> {
        if self.min_wait.is_zero() {
            return Some(Duration::ZERO);
        }

        match self.whole_factor {
            Some(factor) => {
                let multiplier = u128::from(factor).checked_pow(exponent)?;
                nanos_to_duration(self.min_wait.as_nanos().checked_mul(multiplier)?)
            }
            None => {
                let exponent = i32::try_from(exponent).unwrap_or(i32::MAX);
                secs_to_duration_checked(self.min_wait.as_secs_f64() * self.factor.powi(exponent))
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the factor is a non-negative whole number within u32 range"
)]
fn whole_factor(factor: f64) -> Option<u32> {
    (factor >= 0.0 && factor.fract() == 0.0 && factor <= f64::from(u32::MAX)).then_some(factor as u32)
}
