// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Serializable retry configuration.
//!
//! Durations are [`jiff::SignedDuration`] values and accept both ISO 8601 (`"PT1.5S"`) and the
//! friendly format (`"1s 500ms"`). Negative durations are clamped to zero.
//!
//! ```
//! use tenacious::{Retry, RetryConfig};
//!
//! let config: RetryConfig = serde_json::from_str(
//!     r#"{
//!         "name": "fetch_index",
//!         "max_attempts": 5,
//!         "backoff": { "type": "exponential", "min_wait": "PT0.1S", "max_wait": "PT5S", "max_jitter": "PT0.05S" }
//!     }"#,
//! )
//! .unwrap();
//!
//! let retry: Retry<std::io::Error> = Retry::builder().config(&config).build();
//! ```

use std::sync::Arc;
use std::time::Duration;

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{Backoff, ConstantBackoff, ExponentialBackoff, Rnd};

/// Retry settings loaded from configuration files.
///
/// Absent values keep the builder defaults, see [`RetryBuilder::config`][crate::RetryBuilder::config].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Name reported in log events.
    pub name: Option<String>,
    /// Cap on the total number of invocations.
    pub max_attempts: Option<u32>,
    /// Backoff strategy.
    pub backoff: Option<BackoffConfig>,
}

/// Serializable description of a backoff strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackoffConfig {
    /// See [`ConstantBackoff`].
    Constant {
        /// Fixed delay between attempts.
        #[serde(default = "zero")]
        wait: SignedDuration,
        /// Upper bound of the random jitter.
        #[serde(default = "zero")]
        max_jitter: SignedDuration,
    },

    /// See [`ExponentialBackoff`].
    Exponential {
        /// Delay of the first retry.
        min_wait: SignedDuration,
        /// Cap applied to every delay.
        max_wait: SignedDuration,
        /// Upper bound of the random jitter.
        #[serde(default = "zero")]
        max_jitter: SignedDuration,
        /// Growth factor per attempt.
        #[serde(default = "default_factor")]
        factor: f64,
    },
}

impl BackoffConfig {
    /// Builds the described strategy with the default random source.
    #[must_use]
    pub fn build(&self) -> Arc<dyn Backoff> {
        self.build_with_rnd(Rnd::default())
    }

    /// Builds the described strategy with the given random source.
    #[must_use]
    pub fn build_with_rnd(&self, rnd: Rnd) -> Arc<dyn Backoff> {
        match *self {
            Self::Constant { wait, max_jitter } => {
                Arc::new(ConstantBackoff::new(clamp_to_zero(wait), clamp_to_zero(max_jitter)).with_rnd(rnd))
            }
            Self::Exponential {
                min_wait,
                max_wait,
                max_jitter,
                factor,
            } => Arc::new(
                ExponentialBackoff::new(clamp_to_zero(min_wait), clamp_to_zero(max_wait), clamp_to_zero(max_jitter))
                    .with_factor(factor)
                    .with_rnd(rnd),
            ),
        }
    }
}

fn zero() -> SignedDuration {
    SignedDuration::ZERO
}

fn default_factor() -> f64 {
    2.0
}

/// Negative durations become zero.
fn clamp_to_zero(duration: SignedDuration) -> Duration {
    Duration::try_from(duration).unwrap_or(Duration::ZERO)
}
