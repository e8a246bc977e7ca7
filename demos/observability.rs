//! Observability
//!
//! Demonstrates the two observation channels:
//! - the `on_attempt` hook, which receives every attempt record
//! - the `tracing` feature, which emits trace/debug events from the loop
//!
//! Run with: cargo run --example observability --features tracing

use std::time::Duration;

use eddy::testing::FlakyOperation;
use eddy::{RetryExecutor, RetryPolicy};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .init();

    let policy = RetryPolicy::exponential(Duration::from_millis(100)).with_max_attempts(5);

    let mut op = FlakyOperation::failing(3);
    let outcome = RetryExecutor::new(policy)
        .expect("policy is well-formed")
        .run_observed(
            || op.invoke(),
            |attempt| {
                println!(
                    "hook: attempt={} success={} wait={:?} elapsed={:?}",
                    attempt.index,
                    attempt.outcome.is_success(),
                    attempt.wait_before_next,
                    attempt.elapsed
                );
            },
        );

    println!("outcome: {:?}", outcome);
}
