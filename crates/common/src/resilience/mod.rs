//! Resilience patterns for outbound calls
//!
//! The UltiPro endpoints intermittently answer with HTTP 405 and similar
//! transient failures. Instead of wrapping every client method implicitly,
//! callers build a [`RetryExecutor`] from an explicit [`RetryConfig`]
//! (attempt budget, backoff curve, jitter) and a [`RetryPolicy`] (which
//! errors are worth repeating) and apply it per call. Calls that change
//! server state can simply skip the executor.
//!
//! Waiting between attempts goes through the [`Sleeper`](crate::time::Sleeper)
//! abstraction, so tests run without real delays.

pub mod retry;

// Re-export retry types
pub use retry::{
    policies, BackoffStrategy, InvalidRetryConfig, Jitter, RetryConfig, RetryConfigBuilder,
    RetryDecision, RetryError, RetryExecutor, RetryPolicy, RetryResult,
};
