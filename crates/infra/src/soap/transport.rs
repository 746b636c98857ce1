use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};
use ultipro_core::{SoapCall, SoapResponse, SoapTransport};
use ultipro_domain::{ClientConfig, Result, UltiProError};
use uuid::Uuid;

use super::envelope::write_envelope;
use super::parse::parse_response;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// `SoapTransport` posting SOAP 1.2 envelopes over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSoapTransport {
    config: ClientConfig,
    http: HttpClient,
}

impl HttpSoapTransport {
    /// Transport for the endpoints under `config.base_url`, with the
    /// configured request timeout.
    ///
    /// # Errors
    /// `UltiProError::Config` for an invalid configuration, `Network` if the
    /// HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::builder().timeout(config.request_timeout()).build()?;
        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: &ClientConfig, http: HttpClient) -> Self {
        Self { config: config.clone(), http }
    }
}

fn content_type(action: &str) -> String {
    format!("application/soap+xml; charset=utf-8; action=\"{action}\"")
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| UltiProError::InvalidInput(format!("invalid HTTP header name '{name}': {e}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| UltiProError::InvalidInput(format!("invalid value for HTTP header '{name}': {e}")))?;
    Ok((header_name, header_value))
}

/// Error for a non-success status: the SOAP fault when the body carries
/// one, otherwise the HTTP status.
fn status_error(status: StatusCode, body: &str) -> UltiProError {
    match parse_response(body) {
        Err(fault @ UltiProError::SoapFault(_)) => fault,
        _ => UltiProError::Http {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown status").to_string(),
        },
    }
}

#[async_trait]
impl SoapTransport for HttpSoapTransport {
    async fn invoke(&self, call: &SoapCall) -> Result<SoapResponse> {
        let url = self.config.service_url(call.service);
        let message_id = format!("urn:uuid:{}", Uuid::new_v4());
        let envelope = write_envelope(call, &url, &message_id)?;

        let mut request =
            self.http.request(Method::POST, url.as_str()).header(CONTENT_TYPE, content_type(&call.action));
        for (name, value) in &call.http_headers {
            let (name, value) = header_pair(name, value)?;
            request = request.header(name, value);
        }

        debug!(
            service = call.service,
            operation = call.operation,
            message_id = %message_id,
            "Invoking SOAP operation"
        );
        let response = self.http.send(request.body(envelope)).await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| UltiProError::from(InfraError::from(e)))?;

        if status.is_success() {
            return parse_response(&body);
        }

        let error = status_error(status, &body);
        warn!(
            service = call.service,
            operation = call.operation,
            status = status.as_u16(),
            error = %error,
            "SOAP operation failed"
        );
        Err(error)
    }
}
