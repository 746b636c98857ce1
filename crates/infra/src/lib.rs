//! # UltiPro Infrastructure
//!
//! Implementations of the `ultipro-core` ports and the I/O boundaries.
//!
//! This crate contains:
//! - The HTTP SOAP transport (reqwest + quick-xml envelopes)
//! - The configuration loader (environment first, JSON/TOML file fallback)
//! - The report file writer
//!
//! ## Architecture
//! - Implements the `SoapTransport` port defined in `ultipro-core`
//! - Contains all "impure" code (network, environment, filesystem)
//! - External errors are converted to `UltiProError` through `InfraError`

pub mod config;
pub mod errors;
pub mod http;
pub mod output;
pub mod soap;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use output::{write_raw_report, write_report};
pub use soap::HttpSoapTransport;
