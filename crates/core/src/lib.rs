//! # UltiPro Core
//!
//! Client logic for the UltiPro SOAP services - no HTTP or XML code.
//!
//! This crate contains:
//! - The [`SoapTransport`] port every remote call goes through
//! - The Auth Manager (`authenticate`, signed header)
//! - Directory operations on `EmployeePerson` / `EmployeeGlobal`
//! - The report workflow engine (catalog lookup, execution, polling)
//! - The report stream parser
//!
//! ## Architecture Principles
//! - Only depends on `ultipro-domain` and `ultipro-common`
//! - Transport, XML and environment access live in `ultipro-infra`
//! - Waiting goes through an injected `Sleeper`, so the polling state
//!   machine runs instantly under test

pub mod auth;
pub mod client;
pub mod directory;
pub mod ports;
pub mod reports;
pub mod stream;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{Session, SignedHeader};
pub use client::{Idempotency, UltiProClient};
pub use ports::{SoapCall, SoapResponse, SoapTransport};
pub use reports::{ReportPoller, RetrievedReport};
pub use stream::{
    decode_report_stream, delimiter_byte, parse_report, parse_report_stream, unescape,
};
