//! Retry policy object with exponential backoff and jitter
//!
//! A [`RetryExecutor`] combines a [`RetryConfig`] (attempt budget, backoff
//! curve, jitter) with a [`RetryPolicy`] deciding which errors are worth
//! repeating. The executor is applied explicitly around a single call;
//! nothing is retried implicitly.
//!
//! When the attempt budget runs out the last underlying error is handed back
//! inside [`RetryError::AttemptsExhausted`], so callers can surface the
//! original failure instead of a generic "gave up" message.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::time::{Sleeper, TokioSleeper};

/// Errors that can occur during retry operations
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All retry attempts have been exhausted; `source` is the last failure
    #[error("All retry attempts exhausted after {attempts} tries: {source}")]
    AttemptsExhausted { attempts: u32, source: E },

    /// The operation failed with a non-retryable error
    #[error("Operation failed with non-retryable error: {source}")]
    NonRetryable { source: E },
}

impl<E> RetryError<E> {
    /// The underlying operation error.
    pub fn into_source(self) -> E {
        match self {
            Self::AttemptsExhausted { source, .. } | Self::NonRetryable { source } => source,
        }
    }

    /// Borrow the underlying operation error.
    pub fn source_error(&self) -> &E {
        match self {
            Self::AttemptsExhausted { source, .. } | Self::NonRetryable { source } => source,
        }
    }
}

/// Rejected [`RetryConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid retry configuration: {message}")]
pub struct InvalidRetryConfig {
    pub message: String,
}

impl InvalidRetryConfig {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide whether the failure of retry number `attempt` (0-based) is
    /// worth another try
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation after the configured backoff delay
    Retry,
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the delay before retry number `attempt` (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let delay = initial_delay.as_millis() as f64 * base.powi(exponent);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(random_below(delay.as_millis() as u64 + 1)),
        }
    }
}

/// Pseudo-random value in `0..max` seeded from the wall clock's sub-second
/// nanos (LCG constants from Numerical Recipes).
fn random_below(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().subsec_nanos();
    let mut seed = u64::from(nanos).wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    seed % max
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter type for randomizing delays
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    /// Eight attempts, exponential backoff from one second doubling up to a
    /// minute, full jitter.
    fn default() -> Self {
        Self {
            max_attempts: 8,
            backoff: BackoffStrategy::Exponential {
                initial_delay: Duration::from_secs(1),
                base: 2.0,
                max_delay: Duration::from_secs(60),
            },
            jitter: Jitter::Full,
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), InvalidRetryConfig> {
        if self.max_attempts == 0 {
            return Err(InvalidRetryConfig::new("max_attempts must be greater than 0"));
        }

        match &self.backoff {
            BackoffStrategy::Exponential { base, .. } if *base <= 0.0 => {
                Err(InvalidRetryConfig::new("exponential base must be greater than 0"))
            }
            _ => Ok(()),
        }
    }

    /// Pause before retry number `attempt` (0-based), jitter applied
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.jitter.apply(self.backoff.calculate_delay(attempt))
    }
}

/// Builder for RetryConfig with fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    #[must_use]
    pub fn exponential_backoff(
        mut self,
        initial_delay: Duration,
        base: f64,
        max_delay: Duration,
    ) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { initial_delay, base, max_delay };
        self
    }

    #[must_use]
    pub fn no_jitter(mut self) -> Self {
        self.config.jitter = Jitter::None;
        self
    }

    #[must_use]
    pub fn full_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Full;
        self
    }

    pub fn build(self) -> Result<RetryConfig, InvalidRetryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The main retry executor
///
/// Pauses between attempts go through an injected [`Sleeper`], defaulting
/// to [`TokioSleeper`].
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
    sleeper: Arc<dyn Sleeper>,
}

impl<P: fmt::Debug> fmt::Debug for RetryExecutor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy, sleeper: Arc::new(TokioSleeper) }
    }

    /// Replace the sleeper used between attempts
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation with retry logic
    #[instrument(skip(self, operation), fields(max_attempts = self.config.max_attempts))]
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retries = 0u32;

        loop {
            let attempt = retries + 1;
            debug!(attempt, "Executing operation");

            let error = match operation().await {
                Ok(value) => {
                    if retries > 0 {
                        debug!(retries, "Operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if self.policy.should_retry(&error, retries) == RetryDecision::Stop {
                debug!(attempt, error = %error, "Retry policy declined to retry");
                return Err(RetryError::NonRetryable { source: error });
            }

            if attempt >= self.config.max_attempts {
                warn!(attempts = attempt, error = %error, "All retry attempts exhausted");
                return Err(RetryError::AttemptsExhausted { attempts: attempt, source: error });
            }

            let delay = self.config.delay_for(retries);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Operation failed, backing off before retrying"
            );
            self.sleeper.sleep(delay).await;
            retries += 1;
        }
    }
}

/// Pre-defined retry policies
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug, Clone)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
