// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Backoff strategies that compute the delay between retry attempts.
//!
//! A strategy maps the number of failed attempts so far to a [`Duration`]. Strategies are
//! immutable once constructed: the delay depends only on the attempt number, the configured
//! parameters, and the strategy's injected [`Rnd`]. This makes a single instance safe to share
//! across unrelated and concurrent retry sequences.
//!
//! | Strategy | Delay for attempt `n ≥ 1` |
//! |----------|---------------------------|
//! | [`ConstantBackoff`] | `wait + jitter` |
//! | [`ExponentialBackoff`] | `min(min_wait × factor^(n−1) + jitter, max_wait)` |
//!
//! For `n = 0` (no attempt made yet) every strategy returns [`Duration::ZERO`].

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::Rnd;

mod constant;
mod exponential;

pub use constant::ConstantBackoff;
pub use exponential::ExponentialBackoff;

/// Computes the delay to observe before the next attempt.
///
/// Implementations must never block and must be callable concurrently.
///
/// # Examples
///
/// A custom strategy that waits one second per failed attempt:
///
/// ```
/// use std::time::Duration;
///
/// use tenacious::Backoff;
///
/// #[derive(Debug)]
/// struct Linear;
///
/// impl Backoff for Linear {
///     fn next_delay(&self, attempt: u32) -> Duration {
///         Duration::from_secs(u64::from(attempt))
///     }
/// }
///
/// assert_eq!(Linear.next_delay(3), Duration::from_secs(3));
/// ```
pub trait Backoff: Debug + Send + Sync {
    /// Returns the delay to wait after `attempt` failed attempts.
    ///
    /// `attempt` is `0` before any attempt was made, in which case the delay should be zero.
    fn next_delay(&self, attempt: u32) -> Duration;
}

impl<B: Backoff + ?Sized> Backoff for Arc<B> {
    fn next_delay(&self, attempt: u32) -> Duration {
        (**self).next_delay(attempt)
    }
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next_delay(&self, attempt: u32) -> Duration {
        (**self).next_delay(attempt)
    }
}

impl<B: Backoff + ?Sized> Backoff for &B {
    fn next_delay(&self, attempt: u32) -> Duration {
        (**self).next_delay(attempt)
    }
}

/// Returns a uniformly distributed value in `[0, max_jitter]`, or zero when `max_jitter` is zero.
fn jitter(max_jitter: Duration, rnd: &Rnd) -> Duration {
    if max_jitter.is_zero() {
        return Duration::ZERO;
    }

    secs_to_duration_saturating(max_jitter.as_secs_f64() * rnd.next_f64()).min(max_jitter)
}

/// Converts seconds to a duration; non-positive and `NaN` become zero, overflow becomes [`None`].
fn secs_to_duration_checked(secs: f64) -> Option<Duration> {
    if secs.is_nan() || secs <= 0.0 {
        return Some(Duration::ZERO);
    }

    Duration::try_from_secs_f64(secs).ok()
}

/// Converts whole nanoseconds to a duration, [`None`] when out of range.
fn nanos_to_duration(nanos: u128) -> Option<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    let subsec_nanos = u32::try_from(nanos % NANOS_PER_SEC).ok()?;

    Some(Duration::new(secs, subsec_nanos))
}

fn secs_to_duration_saturating(secs: f64) -> Duration {
    secs_to_duration_checked(secs).unwrap_or(Duration::MAX)
}
