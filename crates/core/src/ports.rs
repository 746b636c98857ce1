//! Transport port
//!
//! The workflow never builds envelopes or touches HTTP. It describes a call
//! as a [`SoapCall`] (endpoint, action, header blocks, body) and receives
//! the parsed [`SoapResponse`] trees back.

use async_trait::async_trait;
use ultipro_domain::{Element, Result};

/// One remote operation invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapCall {
    /// Service endpoint relative to the base URL, e.g. `BiDataService`
    pub service: &'static str,
    /// Operation name, used for logging
    pub operation: &'static str,
    /// SOAP action URI
    pub action: String,
    /// SOAP header blocks
    pub headers: Vec<Element>,
    /// Extra HTTP request headers
    pub http_headers: Vec<(String, String)>,
    /// Body payload (the operation element)
    pub body: Element,
}

impl SoapCall {
    /// Call with the action built as `{namespace}/{contract}/{operation}`.
    pub fn new(
        service: &'static str,
        namespace: &str,
        contract: &str,
        operation: &'static str,
        body: Element,
    ) -> Self {
        Self {
            service,
            operation,
            action: format!("{namespace}/{contract}/{operation}"),
            headers: Vec::new(),
            http_headers: Vec::new(),
            body,
        }
    }

    #[must_use]
    pub fn with_header(mut self, header: Element) -> Self {
        self.headers.push(header);
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: impl IntoIterator<Item = Element>) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_http_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.push((name.into(), value.into()));
        self
    }

    /// Value of an extra HTTP header (case-insensitive name match).
    pub fn http_header(&self, name: &str) -> Option<&str> {
        self.http_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parsed response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapResponse {
    /// Content of `Envelope/Header`; an empty element when absent
    pub header: Element,
    /// First element inside `Envelope/Body`
    pub body: Element,
}

impl SoapResponse {
    pub fn new(header: Element, body: Element) -> Self {
        Self { header, body }
    }

    /// Response with an empty header.
    pub fn with_body(body: Element) -> Self {
        Self { header: Element::new("Header"), body }
    }
}

/// Invoke a remote operation.
///
/// Implementations map transport failures to `UltiProError::Network`,
/// non-success HTTP statuses to `UltiProError::Http` and SOAP faults to
/// `UltiProError::SoapFault`. They must not retry on their own.
#[async_trait]
pub trait SoapTransport: Send + Sync {
    async fn invoke(&self, call: &SoapCall) -> Result<SoapResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_is_namespace_contract_operation() {
        let call = SoapCall::new(
            "LoginService",
            "http://www.ultipro.com/services/loginservice",
            "ILoginService",
            "Authenticate",
            Element::new("TokenRequest"),
        );
        assert_eq!(call.action, "http://www.ultipro.com/services/loginservice/ILoginService/Authenticate");
    }

    #[test]
    fn http_header_lookup_ignores_case() {
        let call = SoapCall::new("BiDataService", "ns", "C", "ExecuteReport", Element::new("x"))
            .with_http_header("US-DELIMITER", ";");
        assert_eq!(call.http_header("us-delimiter"), Some(";"));
        assert_eq!(call.http_header("Accept"), None);
    }
}
