//! Testing utilities and helpers
//!
//! - **[`time`]**: a sleeper double that records pauses instead of waiting
//!
//! ## Usage
//!
//! ```rust
//! use ultipro_common::testing::MockSleeper;
//!
//! let sleeper = MockSleeper::new();
//! assert_eq!(sleeper.count(), 0);
//! ```

pub mod time;

pub use time::MockSleeper;
