//! Cancellation
//!
//! Demonstrates cooperative cancellation of an async retry loop: a token
//! shared with another task interrupts the backoff wait mid-sleep, and the
//! run reports `Cancelled` with the attempts completed so far.
//!
//! Run with: cargo run --example cancellation --features async

use std::time::Duration;

use eddy::{CancellationToken, Outcome, RetryExecutor, RetryPolicy};

#[tokio::main]
async fn main() {
    let policy = RetryPolicy::exponential(Duration::from_secs(2)).with_max_attempts(10);
    let token = CancellationToken::new();

    // Elsewhere in the program: give up on the whole endeavor after 500ms.
    let canceller = tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            println!("canceller: signalling");
            token.cancel();
        }
    });

    let outcome: Outcome<(), _> = RetryExecutor::new(policy)
        .expect("policy is well-formed")
        .with_token(token)
        .run_async(|| async {
            println!("operation: attempting (and failing)");
            Err("service unavailable")
        })
        .await;

    match outcome {
        Outcome::Cancelled { attempts } => {
            println!("run cancelled after {} completed attempts", attempts);
        }
        other => println!("unexpected outcome: {:?}", other),
    }

    canceller.await.expect("canceller task panicked");
}
