//! # UltiPro Domain
//!
//! Domain types and models for the UltiPro client.
//!
//! This crate contains:
//! - The client error type and `Result` alias
//! - Credentials and client configuration structures
//! - Report workflow and directory value types
//! - The schema-free [`Element`] record used for SOAP payloads
//! - Wire constants (service names, namespaces, environment keys)
//!
//! ## Architecture
//! - No dependencies on other UltiPro crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
