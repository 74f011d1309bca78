// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

/// Source of randomness used to compute backoff jitter.
///
/// This RNG is **NOT cryptographically secure** and should only be used for jitter and other
/// non-security-critical purposes.
///
/// Every backoff strategy owns its own `Rnd`, so tests can substitute a seeded or fully
/// deterministic generator without touching any global state:
///
/// - [`Rnd::default`]: the thread-local `fastrand` generator.
/// - [`Rnd::with_seed`]: a reproducible sequence from a fixed seed.
/// - [`Rnd::from_fn`]: any function producing values in `[0, 1)`.
///
/// # Examples
///
/// ```
/// use tenacious::Rnd;
///
/// let a = Rnd::with_seed(7);
/// let b = Rnd::with_seed(7);
/// assert_eq!(a.next_f64(), b.next_f64());
///
/// let fixed = Rnd::from_fn(|| 0.25);
/// assert_eq!(fixed.next_f64(), 0.25);
/// ```
#[derive(Clone, Default)]
pub struct Rnd(Source);

#[derive(Clone, Default)]
enum Source {
    #[default]
    ThreadLocal,
    Seeded(Arc<Mutex<fastrand::Rng>>),
    Function(Arc<dyn Fn() -> f64 + Send + Sync>),
}

impl Debug for Rnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Source::ThreadLocal => write!(f, "ThreadLocal"),
            Source::Seeded(_) => write!(f, "Seeded"),
            Source::Function(_) => write!(f, "Function"),
        }
    }
}

impl Rnd {
    /// Creates a generator that yields the same sequence for the same seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self(Source::Seeded(Arc::new(Mutex::new(fastrand::Rng::with_seed(seed)))))
    }

    /// Creates a generator backed by the given function.
    ///
    /// Values outside of `[0, 1]` are clamped into that range and `NaN` is treated as `0`.
    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self(Source::Function(Arc::new(f)))
    }

    /// Returns the next random value in `[0, 1]`.
    #[must_use]
    pub fn next_f64(&self) -> f64 {
        let value = match &self.0 {
            Source::ThreadLocal => fastrand::f64(),
            Source::Seeded(rng) => rng.lock().f64(),
            Source::Function(generator) => generator(),
        };

        if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
    }
}
