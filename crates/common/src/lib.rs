//! Shared runtime utilities for the UltiPro client crates.
//!
//! # Modules
//!
//! - `resilience`: retry policy object (backoff curve, jitter, retry
//!   predicate) applied per outbound call
//! - `time`: sleeper abstraction so that waiting can be driven by a
//!   caller-supplied scheduler
//! - `testing` (feature `test-utils`): a recording `MockSleeper`

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use resilience::{
    policies, BackoffStrategy, InvalidRetryConfig, Jitter, RetryConfig, RetryConfigBuilder,
    RetryDecision, RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
pub use time::{Sleeper, TokioSleeper};
