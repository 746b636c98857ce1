//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP status codes the UltiPro endpoints return intermittently and that
/// succeed when the call is repeated.
const TRANSIENT_HTTP_STATUSES: &[u16] = &[405, 408, 429, 500, 502, 503, 504];

/// Main error type for the UltiPro client
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum UltiProError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("SOAP fault: {0}")]
    SoapFault(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Report {report_key} did not complete (last status: {status})")]
    ReportGeneration { report_key: String, status: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UltiProError {
    /// Whether repeating the same call can reasonably succeed.
    ///
    /// Only transport failures and the HTTP statuses in
    /// `TRANSIENT_HTTP_STATUSES` qualify; lookup and generation failures are
    /// final.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => TRANSIENT_HTTP_STATUSES.contains(status),
            _ => false,
        }
    }

    /// Stable label suitable for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::SoapFault(_) => "soap_fault",
            Self::Auth(_) => "auth",
            Self::ReportNotFound(_) => "report_not_found",
            Self::ReportGeneration { .. } => "report_generation",
            Self::InvalidResponse(_) => "invalid_response",
            Self::InvalidInput(_) => "invalid_input",
            Self::Io(_) => "io",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for UltiPro operations
pub type Result<T> = std::result::Result<T, UltiProError>;
