// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::sync::Arc;

use super::constants::DEFAULT_NAME;
use super::{OnRetry, OnRetryArgs, Policy, Retry, RetryShared};
use crate::Backoff;
use crate::attempt::MaxAttempts;

/// Builder for [`Retry`].
///
/// Created by [`Retry::builder`]. Every setting is optional:
///
/// | Parameter | Default | Configured By |
/// |-----------|---------|---------------|
/// | Max attempts | unlimited | [`max_attempts`][RetryBuilder::max_attempts], [`infinite_attempts`][RetryBuilder::infinite_attempts] |
/// | Backoff | none, attempts follow each other immediately | [`backoff`][RetryBuilder::backoff], [`backoff_shared`][RetryBuilder::backoff_shared] |
/// | Policy | every error is retryable | [`policy`][RetryBuilder::policy] |
/// | On retry | none | [`on_retry`][RetryBuilder::on_retry] |
/// | Name | `"retry"` | [`name`][RetryBuilder::name] |
#[derive(Debug)]
pub struct RetryBuilder<E> {
    name: Cow<'static, str>,
    max_attempts: MaxAttempts,
    backoff: Option<Arc<dyn Backoff>>,
    policy: Option<Policy<E>>,
    on_retry: Option<OnRetry<E>>,
}

impl<E> Default for RetryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RetryBuilder<E> {
    pub(crate) fn new() -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_NAME),
            max_attempts: MaxAttempts::Infinite,
            backoff: None,
            policy: None,
            on_retry: None,
        }
    }

    /// Sets the name reported in log events.
    ///
    /// The name should use `snake_case` and identify the retried operation, e.g. `"fetch_index"`.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Caps the total number of invocations of the operation, including the first one.
    ///
    /// A cap of `0` makes every [`execute`][Retry::execute] call fail with
    /// [`RetryError::NoAttemptsAllowed`][crate::RetryError::NoAttemptsAllowed] without invoking
    /// the operation.
    ///
    /// **Default**: unlimited
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = MaxAttempts::Finite(max_attempts);
        self
    }

    /// Removes the attempt cap.
    ///
    /// The operation is retried until it succeeds, the policy rejects an error, or the
    /// cancellation token fires.
    #[must_use]
    pub fn infinite_attempts(mut self) -> Self {
        self.max_attempts = MaxAttempts::Infinite;
        self
    }

    /// Sets the backoff strategy that paces the attempts.
    ///
    /// **Default**: none
    #[must_use]
    pub fn backoff(self, backoff: impl Backoff + 'static) -> Self {
        self.backoff_shared(Arc::new(backoff))
    }

    /// Sets a backoff strategy that is shared with other retry instances.
    #[must_use]
    pub fn backoff_shared(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Sets the retry policy.
    ///
    /// The predicate receives the error of the failed attempt and returns `true` if the operation
    /// should be retried. Returning `false` ends the retry with
    /// [`RetryError::NonRetryable`][crate::RetryError::NonRetryable], regardless of the remaining
    /// attempts.
    ///
    /// **Default**: every error is retryable
    #[must_use]
    pub fn policy(mut self, policy: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.policy = Some(Policy::new(policy));
        self
    }

    /// Registers a callback invoked before waiting for the next attempt.
    ///
    /// The callback receives the error of the failed attempt and [`OnRetryArgs`] with the attempt
    /// and the computed delay. It is not invoked when the retry terminates.
    #[must_use]
    pub fn on_retry(mut self, on_retry: impl Fn(&E, OnRetryArgs) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(OnRetry::new(on_retry));
        self
    }

    /// Applies a deserialized [`RetryConfig`][crate::RetryConfig].
    ///
    /// Only the values present in the configuration override the builder's current settings.
    #[cfg(any(feature = "serde", test))]
    #[must_use]
    pub fn config(mut self, config: &crate::RetryConfig) -> Self {
        if let Some(name) = &config.name {
            self.name = Cow::Owned(name.clone());
        }

        if let Some(max_attempts) = config.max_attempts {
            self.max_attempts = MaxAttempts::Finite(max_attempts);
        }

        if let Some(backoff) = &config.backoff {
            self.backoff = Some(backoff.build());
        }

        self
    }

    /// Builds the immutable [`Retry`].
    #[must_use]
    pub fn build(self) -> Retry<E> {
        Retry {
            shared: Arc::new(RetryShared {
                name: self.name,
                max_attempts: self.max_attempts,
                backoff: self.backoff,
                policy: self.policy,
                on_retry: self.on_retry,
            }),
        }
    }
}
