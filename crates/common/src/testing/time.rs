//! Deterministic time doubles
//!
//! [`MockSleeper`] returns immediately and records every requested pause,
//! so code that backs off or polls can be checked for how long it would
//! have waited.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use ultipro_common::testing::MockSleeper;
//! use ultipro_common::Sleeper;
//!
//! # tokio_test_block_on(async {
//! let sleeper = MockSleeper::new();
//!
//! sleeper.sleep(Duration::from_secs(30)).await;
//!
//! assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(30)]);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

// Test utilities panic on poisoned mutexes to fail tests early
#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::time::Sleeper;

/// Sleeper that returns immediately and remembers every requested pause.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MockSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested pauses, in order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("mutex poisoned").clone()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.sleeps.lock().expect("mutex poisoned").len()
    }

    /// Sum of all requested pauses.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.sleeps.lock().expect("mutex poisoned").iter().sum()
    }
}

#[async_trait]
impl Sleeper for MockSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().expect("mutex poisoned").push(duration);
    }
}
