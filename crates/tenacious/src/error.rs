// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Returned by [`wait`](crate::wait()) when the cancellation token fires before the delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation was cancelled")]
pub struct Cancelled;

/// The terminal failure of [`Retry::execute`](crate::Retry::execute).
///
/// Every variant that follows a failed invocation keeps the operation's last error as its
/// [`source`](std::error::Error::source), so the original cause stays inspectable through the
/// standard error chain or through [`RetryError::into_inner`].
///
/// # Examples
///
/// ```
/// use std::error::Error;
///
/// use tenacious::RetryError;
///
/// let err = RetryError::Exhausted { attempts: 3, source: std::io::Error::other("refused") };
///
/// assert!(err.is_exhausted());
/// assert_eq!(err.to_string(), "all 3 attempts have been exhausted");
/// assert_eq!(err.source().unwrap().to_string(), "refused");
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RetryError<E> {
    /// The configured attempt cap does not allow a single invocation.
    #[error("no attempts are allowed with max attempts set to {max_attempts}")]
    NoAttemptsAllowed {
        /// The offending cap.
        max_attempts: u32,
    },

    /// The retry policy classified the error as terminal.
    #[error("got a non-retryable error")]
    NonRetryable(#[source] E),

    /// The attempt cap was reached; carries the last error.
    #[error("all {attempts} attempts have been exhausted")]
    Exhausted {
        /// Number of invocations made.
        attempts: u32,
        /// The error returned by the last invocation.
        #[source]
        source: E,
    },

    /// The cancellation token fired while waiting for the next attempt.
    ///
    /// Cancellation takes precedence over the operation's outcome; the last error is retained as
    /// the source for diagnostics.
    #[error("retry was cancelled")]
    Cancelled(#[source] E),
}

impl<E> RetryError<E> {
    /// Returns true if the retry stopped because of cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns true if the retry stopped because the attempt cap was reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Returns true if the retry policy rejected the error.
    #[must_use]
    pub fn is_non_retryable(&self) -> bool {
        matches!(self, Self::NonRetryable(_))
    }

    /// Returns the operation's last error, if any invocation happened.
    #[must_use]
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::NoAttemptsAllowed { .. } => None,
            Self::NonRetryable(e) | Self::Exhausted { source: e, .. } | Self::Cancelled(e) => Some(e),
        }
    }

    /// Consumes the error and returns the operation's last error, if any invocation happened.
    #[must_use]
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::NoAttemptsAllowed { .. } => None,
            Self::NonRetryable(e) | Self::Exhausted { source: e, .. } | Self::Cancelled(e) => Some(e),
        }
    }
}
