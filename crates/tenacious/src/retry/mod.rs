// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Retry driver for fallible asynchronous operations.
//!
//! The primary types are [`Retry`] and [`RetryBuilder`]:
//!
//! - [`Retry`] repeatedly invokes an operation until it succeeds or the retry terminates
//! - [`RetryBuilder`] is used to configure and construct the retry
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use tenacious::{ExponentialBackoff, Retry};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let retry = Retry::builder()
//!     .max_attempts(5)
//!     .backoff(ExponentialBackoff::new(
//!         Duration::from_millis(100),
//!         Duration::from_secs(5),
//!         Duration::from_millis(50),
//!     ))
//!     .policy(|err: &std::io::Error| err.kind() != std::io::ErrorKind::PermissionDenied)
//!     .build();
//!
//! let token = CancellationToken::new();
//! let result = retry.execute(&token, |_token| fetch()).await;
//! # assert!(result.is_ok());
//! # }
//! # async fn fetch() -> std::io::Result<String> { Ok("index".to_string()) }
//! ```
//!
//! # Lifecycle
//!
//! Each [`execute`][Retry::execute] call runs the following loop:
//!
//! 1. If the attempt cap is `0`, fail with [`RetryError::NoAttemptsAllowed`][crate::RetryError::NoAttemptsAllowed].
//! 2. Invoke the operation. On success, return its value.
//! 3. Ask the policy whether the error is retryable. If not, fail with
//!    [`RetryError::NonRetryable`][crate::RetryError::NonRetryable].
//! 4. Count the failed attempt. If the cap is reached, fail with
//!    [`RetryError::Exhausted`][crate::RetryError::Exhausted].
//! 5. Compute the backoff delay for the number of failed attempts and wait for it, racing the
//!    cancellation token. If the token fires first, fail with
//!    [`RetryError::Cancelled`][crate::RetryError::Cancelled]. Otherwise go back to step 2.
//!
//! Without a backoff the wait in step 5 has zero length but still observes the token, so a
//! cancelled token always ends the retry after the current attempt.
//!
//! # Thread Safety
//!
//! [`Retry`] is `Send` and `Sync`. Its configuration is immutable and shared through an `Arc`, so
//! clones are cheap and concurrent `execute` calls never contend on shared state.
//!
//! # Defaults
//!
//! | Parameter | Default Value | Configured By |
//! |-----------|---------------|---------------|
//! | Max attempts | unlimited | [`max_attempts`][RetryBuilder::max_attempts] |
//! | Backoff | none | [`backoff`][RetryBuilder::backoff] |
//! | Policy | always retry | [`policy`][RetryBuilder::policy] |

mod args;
mod builder;
mod callbacks;
mod constants;
mod service;

pub use args::OnRetryArgs;
pub use builder::RetryBuilder;
pub(crate) use callbacks::*;
pub use service::Retry;
pub(crate) use service::RetryShared;
