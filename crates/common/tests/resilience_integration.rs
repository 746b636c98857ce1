//! Integration tests for the resilience module
//!
//! Exercises the retry executor through the public API with deterministic
//! time doubles.

#![cfg(feature = "test-utils")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ultipro_common::testing::MockSleeper;
use ultipro_common::{policies, Jitter, RetryConfig, RetryError, RetryExecutor};

/// Custom error type for testing
#[derive(Debug, Clone, PartialEq)]
struct TestError {
    status: u16,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)
    }
}

impl std::error::Error for TestError {}

fn transient(error: &TestError, _attempt: u32) -> bool {
    matches!(error.status, 405 | 429 | 500 | 502 | 503 | 504)
}

/// Validates exponential backoff across the default eight-attempt budget.
///
/// # Test Steps
/// 1. Build the default configuration without jitter
/// 2. Fail every attempt with a transient status
/// 3. Verify eight calls and seven doubling pauses
/// 4. Verify the last error is returned to the caller
#[tokio::test]
async fn test_default_budget_backs_off_exponentially() {
    let config = RetryConfig { jitter: Jitter::None, ..RetryConfig::default() };
    let sleeper = MockSleeper::new();
    let executor = RetryExecutor::new(config, policies::PredicateRetry::new(transient))
        .with_sleeper(Arc::new(sleeper.clone()));
    let calls = Arc::new(AtomicU32::new(0));

    let result: Result<(), _> = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError { status: 405 })
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 8);
    let secs: Vec<u64> = sleeper.sleeps().iter().map(Duration::as_secs).collect();
    assert_eq!(secs, vec![1, 2, 4, 8, 16, 32, 60]);
    assert_eq!(sleeper.total(), Duration::from_secs(123));
    match result {
        Err(RetryError::AttemptsExhausted { attempts: 8, source }) => {
            assert_eq!(source, TestError { status: 405 });
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Validates that a client error stops immediately.
///
/// # Test Steps
/// 1. Fail with HTTP 401
/// 2. Verify a single call and no pause
#[tokio::test]
async fn test_client_error_is_not_retried() {
    let sleeper = MockSleeper::new();
    let executor = RetryExecutor::new(RetryConfig::default(), policies::PredicateRetry::new(transient))
        .with_sleeper(Arc::new(sleeper.clone()));

    let result: Result<(), _> =
        executor.execute(|| async { Err(TestError { status: 401 }) }).await;

    assert_eq!(sleeper.count(), 0);
    assert_eq!(result.unwrap_err().into_source(), TestError { status: 401 });
}

/// Validates recovery once the server stops failing.
///
/// # Test Steps
/// 1. Fail twice with HTTP 503, then succeed
/// 2. Verify the value is returned after two pauses
#[tokio::test]
async fn test_recovers_after_transient_failures() {
    let sleeper = MockSleeper::new();
    let executor = RetryExecutor::new(RetryConfig::default(), policies::PredicateRetry::new(transient))
        .with_sleeper(Arc::new(sleeper.clone()));
    let calls = Arc::new(AtomicU32::new(0));

    let result = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(TestError { status: 503 })
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(sleeper.count(), 2);
}
