//! SOAP 1.2 over HTTP
//!
//! [`envelope`] serializes a `SoapCall` into a WS-Addressing envelope,
//! [`parse`] turns a response document back into `Element` trees and
//! [`HttpSoapTransport`] ties both to the HTTP client.

pub mod envelope;
pub mod parse;
mod transport;

pub use envelope::write_envelope;
pub use parse::{parse_document, parse_response};
pub use transport::HttpSoapTransport;
