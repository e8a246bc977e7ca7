//! Retry Basics
//!
//! Demonstrates the synchronous retry loop:
//! - Building a policy with exponential backoff
//! - Running a flaky operation to success
//! - Distinguishing transient from fatal errors with a classifier
//! - Observing every attempt through the hook

use std::time::Duration;

use eddy::testing::FlakyOperation;
use eddy::{retryable_when, Outcome, RetryExecutor, RetryPolicy};

fn example_success_after_failures() {
    println!("\n=== Example 1: Success After Transient Failures ===");

    let policy = RetryPolicy::exponential(Duration::from_millis(50)).with_max_attempts(5);

    let mut op = FlakyOperation::failing(2);
    let outcome = RetryExecutor::new(policy)
        .expect("policy is well-formed")
        .run_observed(
            || op.invoke(),
            |attempt| match attempt.wait_before_next {
                Some(wait) => println!(
                    "  attempt {} failed, retrying in {:?}",
                    attempt.index, wait
                ),
                None => println!("  attempt {} concluded the run", attempt.index),
            },
        );

    match outcome {
        Outcome::Succeeded { value, attempts } => {
            println!("Succeeded after {} attempts (value: {})", attempts, value);
        }
        Outcome::Exhausted { error, attempts } => {
            println!("Exhausted after {} attempts: {}", attempts, error);
        }
        Outcome::Cancelled { attempts } => {
            println!("Cancelled after {} attempts", attempts);
        }
    }
}

fn example_fatal_errors_stop_immediately() {
    println!("\n=== Example 2: Fatal Errors Stop Immediately ===");

    #[derive(Debug, PartialEq)]
    enum PaymentError {
        GatewayTimeout,
        CardDeclined,
    }

    let policy = RetryPolicy::exponential(Duration::from_millis(50)).with_max_attempts(5);

    let outcome: Outcome<(), _> = RetryExecutor::new(policy)
        .expect("policy is well-formed")
        .with_classifier(retryable_when(|e: &PaymentError| {
            *e == PaymentError::GatewayTimeout
        }))
        .run(|| Err(PaymentError::CardDeclined));

    // A declined card will not succeed on re-submission; the loop stops on
    // the first attempt instead of hammering the gateway.
    println!("Outcome: {:?}", outcome);
    assert_eq!(outcome.attempts(), 1);
}

fn main() {
    example_success_after_failures();
    example_fatal_errors_stop_immediately();
}
