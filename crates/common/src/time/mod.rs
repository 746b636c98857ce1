//! Time abstractions
//!
//! [`Sleeper`] answers "wait this long". Production code uses
//! [`TokioSleeper`]; tests swap in the recording double from `testing`.

pub mod sleeper;

pub use sleeper::{Sleeper, TokioSleeper};
