//! Configuration loading
//!
//! This module is the only place that reads the process environment or
//! configuration files; everything else receives a `ClientConfig`.

pub mod loader;

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, discover_config_path};
