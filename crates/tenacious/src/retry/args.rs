// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::Attempt;

/// Arguments for the [`on_retry`][super::RetryBuilder::on_retry] callback function.
///
/// Provides context for retry notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnRetryArgs {
    pub(super) attempt: Attempt,
    pub(super) retry_delay: Duration,
}

impl OnRetryArgs {
    /// Returns the attempt that just failed.
    #[must_use]
    pub fn attempt(&self) -> Attempt {
        self.attempt
    }

    /// Returns the delay before the next attempt.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}
