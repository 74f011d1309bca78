// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use pin_project_lite::pin_project;
use tokio::time::Sleep;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::Cancelled;

/// Waits for `delay` unless `token` is cancelled first.
///
/// The returned future resolves to `Ok(())` when the delay elapses and to `Err(Cancelled)` as soon
/// as the token fires. Cancellation is checked before the timer, so an already cancelled token
/// completes on the first poll, even for a zero delay. A zero delay does not register a timer,
/// but it still yields to the runtime once, so other tasks (including one cancelling the token)
/// get to run before the wait completes.
///
/// The timer lives inside the returned future and is released when the future completes or is
/// dropped, whichever branch wins.
///
/// Timers are driven by the Tokio runtime, so a non-zero delay must be awaited from within a
/// runtime with the time driver enabled.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let token = CancellationToken::new();
/// assert!(tenacious::wait(&token, Duration::from_millis(1)).await.is_ok());
///
/// token.cancel();
/// assert!(tenacious::wait(&token, Duration::from_secs(3600)).await.is_err());
/// # }
/// ```
pub fn wait(token: &CancellationToken, delay: Duration) -> Wait<'_> {
    Wait {
        cancelled: token.cancelled(),
        sleep: (!delay.is_zero()).then(|| tokio::time::sleep(delay)),
        yielded: false,
    }
}

pin_project! {
    /// Future returned by [`wait()`].
    #[derive(Debug)]
    #[must_use = "futures do nothing unless polled"]
    pub struct Wait<'a> {
        #[pin]
        cancelled: WaitForCancellationFuture<'a>,
        #[pin]
        sleep: Option<Sleep>,
        yielded: bool,
    }
}

impl Future for Wait<'_> {
    type Output = Result<(), Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if this.cancelled.poll(cx).is_ready() {
            return Poll::Ready(Err(Cancelled));
        }

        match this.sleep.as_pin_mut() {
            Some(sleep) => sleep.poll(cx).map(Ok),
            None if *this.yielded => Poll::Ready(Ok(())),
            None => {
                // zero delay: give the runtime one turn so cancellation can be observed
                *this.yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }
}
