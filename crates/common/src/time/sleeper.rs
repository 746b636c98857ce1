//! Injectable waiting
//!
//! Every pause in the client (backoff between retry attempts, the interval
//! between report status checks) goes through a [`Sleeper`]. Tests pass a
//! recording double so that a 30-attempt polling loop finishes instantly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Asynchronous scheduler for pauses.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

#[async_trait]
impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn test_tokio_sleeper_waits() {
        let start = Instant::now();
        TokioSleeper.sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_tokio_sleeper_zero_returns_immediately() {
        let start = Instant::now();
        TokioSleeper.sleep(Duration::ZERO).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
