// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the retry driver using only public API.

use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tenacious::{Backoff, ConstantBackoff, ExponentialBackoff, Retry, RetryError, Rnd};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum FetchError {
    #[error("service unavailable")]
    Unavailable,
    #[error("access denied")]
    Denied,
}

/// Fails with [`FetchError::Unavailable`] for the first `failures` calls, then returns the call number.
async fn fail_first(calls: &AtomicU32, failures: u32) -> Result<u32, FetchError> {
    let call = calls.fetch_add(1, Ordering::SeqCst) + 1;

    if call <= failures { Err(FetchError::Unavailable) } else { Ok(call) }
}

#[tokio::test(start_paused = true)]
async fn zero_max_attempts_never_invokes_operation() {
    let retry = Retry::<FetchError>::builder().max_attempts(0).build();
    let calls = &AtomicU32::new(0);

    let err = retry
        .execute(&CancellationToken::new(), |_| fail_first(calls, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, RetryError::NoAttemptsAllowed { max_attempts: 0 }));
    assert_eq!(err.to_string(), "no attempts are allowed with max attempts set to 0");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn succeeds_on_last_allowed_attempt() {
    let retry = Retry::builder().max_attempts(3).build();
    let calls = &AtomicU32::new(0);

    let result = retry.execute(&CancellationToken::new(), |_| fail_first(calls, 2)).await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn succeeds_with_backoff() {
    let retry = Retry::builder()
        .max_attempts(3)
        .backoff(ConstantBackoff::new(Duration::from_millis(2), Duration::from_millis(1)))
        .build();
    let calls = &AtomicU32::new(0);
    let start = Instant::now();

    let result = retry.execute(&CancellationToken::new(), |_| fail_first(calls, 2)).await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(start.elapsed() >= Duration::from_millis(4));
    assert!(start.elapsed() <= Duration::from_millis(6));
}

#[tokio::test(start_paused = true)]
async fn single_attempt_exhausts_without_waiting() {
    let retry = Retry::builder()
        .max_attempts(1)
        .backoff(ConstantBackoff::new(Duration::from_secs(3600), Duration::ZERO))
        .build();
    let calls = &AtomicU32::new(0);
    let start = Instant::now();

    let err = retry
        .execute(&CancellationToken::new(), |_| fail_first(calls, u32::MAX))
        .await
        .unwrap_err();

    assert!(err.is_exhausted());
    assert_eq!(err.to_string(), "all 1 attempts have been exhausted");
    assert_eq!(err.into_inner(), Some(FetchError::Unavailable));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn exhausted_keeps_last_error_as_source() {
    let retry = Retry::builder().max_attempts(5).build();
    let calls = &AtomicU32::new(0);

    let err = retry
        .execute(&CancellationToken::new(), |_| fail_first(calls, u32::MAX))
        .await
        .unwrap_err();

    let source = err.source().and_then(|source| source.downcast_ref::<FetchError>());
    assert_eq!(source, Some(&FetchError::Unavailable));
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_wait_returns_early() {
    let retry = Retry::builder()
        .max_attempts(10)
        .backoff(ConstantBackoff::new(Duration::from_secs(10), Duration::ZERO))
        .build();
    let calls = &AtomicU32::new(0);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = retry.execute(&token, |_| fail_first(calls, u32::MAX)).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.to_string(), "retry was cancelled");
    assert_eq!(err.into_inner(), Some(FetchError::Unavailable));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn cancellation_without_backoff_is_observed() {
    let retry = Retry::<FetchError>::default();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = retry
        .execute(&token, |_| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err::<(), _>(FetchError::Unavailable)
        })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(start.elapsed() <= Duration::from_millis(1100));
}

#[tokio::test]
async fn cancellation_from_other_task_stops_immediate_failures() {
    let retry = Retry::<FetchError>::default();
    let calls = &AtomicU32::new(0);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move { canceller.cancel() });

    let err = retry.execute(&token, |_| fail_first(calls, u32::MAX)).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn timed_cancellation_stops_immediate_failures() {
    let retry = Retry::<FetchError>::default();
    let calls = &AtomicU32::new(0);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        retry.execute(&token, |_| fail_first(calls, u32::MAX)),
    )
    .await
    .expect("retry should observe cancellation")
    .unwrap_err();

    assert!(err.is_cancelled());
    assert!(calls.load(Ordering::SeqCst) >= 1);
}

#[tokio::test(start_paused = true)]
async fn operation_can_observe_cancellation() {
    let retry = Retry::<FetchError>::default();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = retry
        .execute(&token, |token| async move {
            token.cancelled().await;
            Err::<(), _>(FetchError::Unavailable)
        })
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn non_retryable_error_stops_immediately() {
    let retry = Retry::builder()
        .max_attempts(10)
        .policy(|err: &FetchError| *err != FetchError::Denied)
        .build();
    let calls = &AtomicU32::new(0);

    let err = retry
        .execute(&CancellationToken::new(), |_| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(FetchError::Denied)
        })
        .await
        .unwrap_err();

    assert!(err.is_non_retryable());
    assert_eq!(err.to_string(), "got a non-retryable error");
    assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("access denied"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn policy_is_evaluated_per_error() {
    let evaluated = Arc::new(AtomicU32::new(0));
    let evaluated_clone = Arc::clone(&evaluated);

    let retry = Retry::builder()
        .policy(move |err: &FetchError| {
            evaluated_clone.fetch_add(1, Ordering::SeqCst);
            *err == FetchError::Unavailable
        })
        .build();
    let calls = &AtomicU32::new(0);

    let err = retry
        .execute(&CancellationToken::new(), |_| async move {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err::<(), _>(if call < 4 { FetchError::Unavailable } else { FetchError::Denied })
        })
        .await
        .unwrap_err();

    assert_eq!(err.into_inner(), Some(FetchError::Denied));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(evaluated.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn policy_rejection_precedes_exhaustion() {
    let retry = Retry::builder()
        .max_attempts(1)
        .policy(|_: &FetchError| false)
        .build();

    let err = retry
        .execute(&CancellationToken::new(), |_| async { Err::<(), _>(FetchError::Unavailable) })
        .await
        .unwrap_err();

    assert!(err.is_non_retryable());
}

#[tokio::test(start_paused = true)]
async fn unlimited_attempts_retry_until_success() {
    let retry = Retry::builder()
        .backoff(ConstantBackoff::new(Duration::from_secs(1), Duration::ZERO))
        .build();
    let calls = &AtomicU32::new(0);
    let start = Instant::now();

    let result = retry.execute(&CancellationToken::new(), |_| fail_first(calls, 50)).await;

    assert_eq!(result.unwrap(), 51);
    assert_eq!(start.elapsed(), Duration::from_secs(50));
}

#[tokio::test(start_paused = true)]
async fn exponential_delays_are_observed() {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let delays_clone = Arc::clone(&delays);

    let retry = Retry::builder()
        .max_attempts(6)
        .backoff(ExponentialBackoff::new(Duration::from_millis(2), Duration::from_millis(10), Duration::ZERO))
        .on_retry(move |_: &FetchError, args| delays_clone.lock().unwrap().push(args.retry_delay()))
        .build();
    let calls = &AtomicU32::new(0);
    let start = Instant::now();

    let err = retry
        .execute(&CancellationToken::new(), |_| fail_first(calls, u32::MAX))
        .await
        .unwrap_err();

    assert!(matches!(err, RetryError::Exhausted { attempts: 6, .. }));
    assert_eq!(*delays.lock().unwrap(), [2, 4, 8, 10, 10].map(Duration::from_millis).to_vec());
    assert_eq!(start.elapsed(), Duration::from_millis(34));
}

#[tokio::test(start_paused = true)]
async fn seeded_jitter_is_reproducible_across_runs() {
    async fn observed_delays(seed: u64) -> Vec<Duration> {
        let delays = Arc::new(Mutex::new(Vec::new()));
        let delays_clone = Arc::clone(&delays);

        let retry = Retry::builder()
            .max_attempts(8)
            .backoff(
                ExponentialBackoff::new(Duration::from_millis(10), Duration::from_secs(1), Duration::from_millis(10))
                    .with_rnd(Rnd::with_seed(seed)),
            )
            .on_retry(move |_: &FetchError, args| delays_clone.lock().unwrap().push(args.retry_delay()))
            .build();

        let calls = &AtomicU32::new(0);
        let _ = retry
            .execute(&CancellationToken::new(), |_| fail_first(calls, u32::MAX))
            .await;

        let delays = delays.lock().unwrap().clone();
        delays
    }

    assert_eq!(observed_delays(9).await, observed_delays(9).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_retry_runs_concurrently() {
    let backoff: Arc<dyn Backoff> = Arc::new(ConstantBackoff::new(Duration::from_millis(1), Duration::from_millis(1)));
    let retry = Retry::<FetchError>::builder().max_attempts(3).backoff_shared(backoff).build();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let retry = retry.clone();
            tokio::spawn(async move {
                let calls = AtomicU32::new(0);
                let result = retry.execute(&CancellationToken::new(), |_| fail_first(&calls, 2)).await;
                (result, calls.load(Ordering::SeqCst))
            })
        })
        .collect();

    for task in tasks {
        let (result, calls) = task.await.unwrap();
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }
}
