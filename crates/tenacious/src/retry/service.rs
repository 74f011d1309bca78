// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::*;
use crate::attempt::MaxAttempts;
use crate::{Attempt, Backoff, RetryError, wait};

/// Repeatedly invokes a fallible operation until it succeeds or the retry terminates.
///
/// A `Retry` is immutable once built and cheap to clone; the same instance can drive any number of
/// independent, possibly concurrent, [`execute`][Retry::execute] calls. Each call owns its attempt
/// counter.
///
/// Retry is configured by calling [`Retry::builder`] and using the builder methods on the returned
/// [`RetryBuilder`] instance.
///
/// For comprehensive examples and usage patterns, see the [retry module][crate::retry] documentation.
#[derive(Debug)]
pub struct Retry<E> {
    pub(super) shared: Arc<RetryShared<E>>,
}

/// Shared configuration for [`Retry`].
#[derive(Debug)]
pub(crate) struct RetryShared<E> {
    pub(crate) name: Cow<'static, str>,
    pub(crate) max_attempts: MaxAttempts,
    pub(crate) backoff: Option<Arc<dyn Backoff>>,
    pub(crate) policy: Option<Policy<E>>,
    pub(crate) on_retry: Option<OnRetry<E>>,
}

impl<E> Clone for Retry<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> Default for Retry<E> {
    fn default() -> Self {
        RetryBuilder::new().build()
    }
}

impl<E> Retry<E> {
    /// Returns a builder for configuring a new retry.
    #[must_use]
    pub fn builder() -> RetryBuilder<E> {
        RetryBuilder::new()
    }

    /// Invokes `operation` until it succeeds or the retry terminates.
    ///
    /// The operation receives a clone of `token` and may observe it to stop early; the retry never
    /// interrupts a running invocation. Between failed attempts the retry waits for the backoff
    /// delay, racing the wait against `token`.
    ///
    /// # Errors
    ///
    /// - [`RetryError::NoAttemptsAllowed`] if the attempt cap is `0`; the operation is not invoked.
    /// - [`RetryError::NonRetryable`] if the policy rejects an error.
    /// - [`RetryError::Exhausted`] if the attempt cap is reached.
    /// - [`RetryError::Cancelled`] if `token` fires while waiting for the next attempt.
    pub async fn execute<T, F, Fut>(&self, token: &CancellationToken, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let MaxAttempts::Finite(max_attempts) = self.shared.max_attempts
            && max_attempts < 1
        {
            return Err(RetryError::NoAttemptsAllowed { max_attempts });
        }

        let mut attempt = self.shared.max_attempts.first_attempt();

        loop {
            let error = match operation(token.clone()).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            // evaluate whether to retry
            let state = match self.shared.evaluate_attempt(error, attempt) {
                ControlFlow::Continue(state) => state,
                ControlFlow::Break(err) => return Err(err),
            };

            if wait(token, state.delay).await.is_err() {
                self.shared.emit_cancelled(attempt);
                return Err(RetryError::Cancelled(state.error));
            }

            attempt = state.attempt;
        }
    }
}

impl<E> RetryShared<E> {
    pub(crate) fn is_retryable(&self, error: &E) -> bool {
        self.policy.as_ref().is_none_or(|policy| policy.call(error))
    }

    fn evaluate_attempt(&self, error: E, attempt: Attempt) -> ControlFlow<RetryError<E>, ContinueRetry<E>> {
        if !self.is_retryable(&error) {
            self.emit_terminal(attempt, "non_retryable");
            return ControlFlow::Break(RetryError::NonRetryable(error));
        }

        let Some(next_attempt) = attempt.increment(self.max_attempts) else {
            self.emit_terminal(attempt, "exhausted");
            return ControlFlow::Break(RetryError::Exhausted {
                attempts: attempt.count(),
                source: error,
            });
        };

        let retry_delay = self.compute_retry_delay(attempt);

        self.emit_telemetry(attempt, retry_delay);

        if let Some(on_retry) = &self.on_retry {
            on_retry.call(&error, OnRetryArgs { attempt, retry_delay });
        }

        ControlFlow::Continue(ContinueRetry {
            error,
            attempt: next_attempt,
            delay: retry_delay,
        })
    }

    fn compute_retry_delay(&self, attempt: Attempt) -> Duration {
        self.backoff
            .as_ref()
            .map_or(Duration::ZERO, |backoff| backoff.next_delay(attempt.count()))
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    fn emit_telemetry(&self, attempt: Attempt, retry_delay: Duration) {
        #[cfg(any(feature = "logs", test))]
        tracing::event!(
            name: "tenacious.retry",
            tracing::Level::WARN,
            retry.name = %self.name,
            retry.attempt.index = attempt.index(),
            retry.attempt.is_last = attempt.is_last(),
            retry.delay = retry_delay.as_secs_f32(),
        );
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, clippy::unused_self, reason = "unused when logs feature not used")
    )]
    fn emit_terminal(&self, attempt: Attempt, outcome: &'static str) {
        #[cfg(any(feature = "logs", test))]
        tracing::event!(
            name: "tenacious.retry.end",
            tracing::Level::DEBUG,
            retry.name = %self.name,
            retry.attempt.index = attempt.index(),
            retry.outcome = outcome,
        );
    }

    fn emit_cancelled(&self, attempt: Attempt) {
        self.emit_terminal(attempt, "cancelled");
    }
}

/// State passed between attempts when continuing the retry loop.
struct ContinueRetry<E> {
    error: E,
    attempt: Attempt,
    delay: Duration,
}
