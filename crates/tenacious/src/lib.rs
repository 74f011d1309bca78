// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Retry orchestration for fallible asynchronous operations.
//!
//! This crate repeatedly invokes an operation until it succeeds, a retry policy declares its
//! error non-retryable, the attempt budget is exhausted, or a cancellation token fires. Between
//! attempts it waits according to a pluggable backoff strategy, and every wait is raced against
//! the cancellation token.
//!
//! # Core Types
//!
//! - [`Retry`]: The retry driver, configured through [`RetryBuilder`].
//! - [`Backoff`]: Computes the delay before the next attempt. Built-in strategies are
//!   [`ConstantBackoff`] and [`ExponentialBackoff`].
//! - [`Rnd`]: The random source used for jitter, injected into each strategy.
//! - [`RetryError`]: The terminal failure of a retry, keeping the operation's last error as its
//!   source.
//! - [`wait()`]: A delay that completes early when a cancellation token fires.
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use tenacious::{ConstantBackoff, Retry, RetryError};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let retry = Retry::builder()
//!     .max_attempts(3)
//!     .backoff(ConstantBackoff::new(Duration::from_millis(100), Duration::from_millis(20)))
//!     .build();
//!
//! let token = CancellationToken::new();
//! let result: Result<(), RetryError<std::io::Error>> = retry
//!     .execute(&token, |_token| async { Err(std::io::Error::other("connection refused")) })
//!     .await;
//!
//! assert!(matches!(result, Err(RetryError::Exhausted { attempts: 3, .. })));
//! # }
//! ```
//!
//! # Cancellation
//!
//! The cancellation token is owned by the caller. The retry hands a clone of it to every
//! invocation so the operation can stop cooperatively, and races it against every backoff wait.
//! A running invocation is never interrupted; cancellation only prevents further attempts.
//!
//! # Features
//!
//! - `logs`: Emits `tracing` events for every retry decision.
//! - `serde`: Enables [`RetryConfig`] for loading retry settings from configuration files.

mod attempt;
pub mod backoff;
mod define_fn_wrapper;
mod error;
pub mod retry;
mod rnd;
mod wait;

#[cfg(any(feature = "serde", test))]
mod config;

pub use attempt::Attempt;
pub use backoff::{Backoff, ConstantBackoff, ExponentialBackoff};
#[cfg(any(feature = "serde", test))]
pub use config::{BackoffConfig, RetryConfig};
pub(crate) use define_fn_wrapper::define_fn_wrapper;
pub use error::{Cancelled, RetryError};
pub use retry::{OnRetryArgs, Retry, RetryBuilder};
pub use rnd::Rnd;
pub use wait::{Wait, wait};

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
pub(crate) mod testing;
