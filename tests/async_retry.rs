#![cfg(feature = "async")]
//! Integration tests for the async retry entry points.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eddy::{
    retryable_when, CancellationToken, Outcome, RetryExecutor, RetryPolicy,
};

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::fixed(Duration::from_millis(1)).with_max_attempts(max_attempts)
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));

    let outcome = RetryExecutor::new(quick_policy(5))
        .unwrap()
        .run_async({
            let attempts = attempts.clone();
            move || {
                let attempts = attempts.clone();
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err("transient failure")
                    } else {
                        Ok("success")
                    }
                }
            }
        })
        .await;

    assert_eq!(
        outcome,
        Outcome::Succeeded {
            value: "success",
            attempts: 3
        }
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_exhausted_returns_final_error() {
    let outcome: Outcome<(), _> = RetryExecutor::new(quick_policy(4))
        .unwrap()
        .run_async(|| async { Err("always fails") })
        .await;

    assert_eq!(
        outcome,
        Outcome::Exhausted {
            error: "always fails",
            attempts: 4
        }
    );
}

#[tokio::test]
async fn test_fatal_error_skips_remaining_attempts() {
    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    let attempts = Arc::new(AtomicU32::new(0));

    let outcome: Outcome<(), _> = RetryExecutor::new(quick_policy(5))
        .unwrap()
        .with_classifier(retryable_when(|e: &TestError| *e == TestError::Transient))
        .run_async({
            let attempts = attempts.clone();
            move || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Permanent)
                }
            }
        })
        .await;

    assert_eq!(
        outcome,
        Outcome::Exhausted {
            error: TestError::Permanent,
            attempts: 1
        }
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancellation_during_backoff() {
    let policy = RetryPolicy::fixed(Duration::from_secs(30)).with_max_attempts(5);
    let token = CancellationToken::new();

    let canceller = tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            token.cancel();
        }
    });

    let start = std::time::Instant::now();
    let calls = Arc::new(AtomicU32::new(0));

    let outcome: Outcome<(), _> = RetryExecutor::new(policy)
        .unwrap()
        .with_token(token)
        .run_async({
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("transient")
                }
            }
        })
        .await;

    assert_eq!(outcome, Outcome::Cancelled { attempts: 1 });
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() < Duration::from_secs(5));

    canceller.await.unwrap();
}

#[tokio::test]
async fn test_cancellation_before_first_attempt() {
    let token = CancellationToken::new();
    token.cancel();

    let calls = Arc::new(AtomicU32::new(0));
    let outcome: Outcome<(), &str> = RetryExecutor::new(quick_policy(3))
        .unwrap()
        .with_token(token)
        .run_async({
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }
        })
        .await;

    assert_eq!(outcome, Outcome::Cancelled { attempts: 0 });
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_exponential_backoff_timing() {
    let policy = RetryPolicy::exponential(Duration::from_millis(10)).with_max_attempts(5);
    let attempts = Arc::new(AtomicU32::new(0));

    let start = std::time::Instant::now();
    let outcome = RetryExecutor::new(policy)
        .unwrap()
        .run_async({
            let attempts = attempts.clone();
            move || {
                let attempts = attempts.clone();
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    if n < 3 {
                        Err("retry")
                    } else {
                        Ok("done")
                    }
                }
            }
        })
        .await;

    assert!(outcome.is_succeeded());
    assert_eq!(outcome.attempts(), 4);

    // Backoff waits: 10ms + 20ms + 40ms = 70ms minimum.
    // Add some tolerance for execution time.
    let elapsed = start.elapsed();
    assert!(
        elapsed >= Duration::from_millis(50),
        "Expected at least 50ms, got {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_observer_sees_every_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));
    let mut trace: Vec<(u32, bool, Option<Duration>)> = Vec::new();

    let outcome = RetryExecutor::new(quick_policy(5))
        .unwrap()
        .run_async_observed(
            {
                let attempts = attempts.clone();
                move || {
                    let attempts = attempts.clone();
                    async move {
                        let n = attempts.fetch_add(1, Ordering::SeqCst);
                        if n < 1 {
                            Err("transient")
                        } else {
                            Ok(n + 1)
                        }
                    }
                }
            },
            |attempt| {
                trace.push((
                    attempt.index,
                    attempt.outcome.is_success(),
                    attempt.wait_before_next,
                ));
            },
        )
        .await;

    assert_eq!(
        outcome,
        Outcome::Succeeded {
            value: 2,
            attempts: 2
        }
    );
    assert_eq!(
        trace,
        vec![
            (1, false, Some(Duration::from_millis(1))),
            (2, true, None),
        ]
    );
}
