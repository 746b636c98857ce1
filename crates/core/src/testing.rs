//! Test doubles for the transport port
//!
//! [`ScriptedTransport`] answers each operation from a per-operation queue of
//! canned results and records every call it receives. [`responses`] builds
//! the response trees the UltiPro services return.

#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use ultipro_domain::{ClientConfig, Credentials, Result, UltiProError};

use crate::ports::{SoapCall, SoapResponse, SoapTransport};

/// Client configuration with fixed test credentials.
pub fn config() -> ClientConfig {
    let credentials =
        Credentials::new("svc-user", "s3cret", "CAK01", "UAK01").expect("valid test credentials");
    ClientConfig::new(credentials).with_base_url("https://service4.example.com/services/")
}

/// Transport returning queued results per operation.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    queues: Mutex<HashMap<String, VecDeque<Result<SoapResponse>>>>,
    calls: Mutex<Vec<SoapCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response for `operation`.
    pub fn push(&self, operation: &str, response: SoapResponse) {
        self.push_result(operation, Ok(response));
    }

    /// Queue a failure for `operation`.
    pub fn push_error(&self, operation: &str, error: UltiProError) {
        self.push_result(operation, Err(error));
    }

    pub fn push_result(&self, operation: &str, result: Result<SoapResponse>) {
        self.queues
            .lock()
            .expect("mutex poisoned")
            .entry(operation.to_string())
            .or_default()
            .push_back(result);
    }

    /// Every call received, in order.
    pub fn calls(&self) -> Vec<SoapCall> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    /// Number of calls received for `operation`.
    pub fn calls_to(&self, operation: &str) -> usize {
        self.calls.lock().expect("mutex poisoned").iter().filter(|c| c.operation == operation).count()
    }

    /// Most recent call received for `operation`.
    pub fn last_call(&self, operation: &str) -> Option<SoapCall> {
        self.calls
            .lock()
            .expect("mutex poisoned")
            .iter()
            .rev()
            .find(|c| c.operation == operation)
            .cloned()
    }
}

#[async_trait]
impl SoapTransport for ScriptedTransport {
    async fn invoke(&self, call: &SoapCall) -> Result<SoapResponse> {
        self.calls.lock().expect("mutex poisoned").push(call.clone());
        self.queues
            .lock()
            .expect("mutex poisoned")
            .get_mut(call.operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(UltiProError::Internal(format!("no scripted response for {}", call.operation)))
            })
    }
}

/// Canned response trees.
pub mod responses {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use ultipro_domain::Element;

    use crate::ports::SoapResponse;

    /// Response with `body` as the operation element.
    pub fn body(body: Element) -> SoapResponse {
        SoapResponse::with_body(body)
    }

    /// `Authenticate` success.
    pub fn token(token: &str) -> SoapResponse {
        body(
            Element::new("TokenResponse")
                .with_child(Element::leaf("Status", "Ok"))
                .with_child(Element::new("StatusMessage"))
                .with_child(Element::leaf("Token", token)),
        )
    }

    /// `LogOnWithToken` success with a recognisable instance key.
    pub fn log_on(instance_key: &str) -> SoapResponse {
        body(
            Element::new("LogOnWithTokenResponse").with_child(
                Element::new("LogOnWithTokenResult")
                    .with_child(Element::leaf("ServiceId", "svc-1"))
                    .with_child(Element::leaf("ClientAccessKey", "CAK01"))
                    .with_child(Element::leaf("Token", "tok"))
                    .with_child(Element::leaf("Status", "Ok"))
                    .with_child(Element::leaf("InstanceKey", instance_key)),
            ),
        )
    }

    /// `GetReportList` with `(name, path)` entries.
    pub fn report_list(reports: &[(&str, &str)]) -> SoapResponse {
        let list = Element::new("Reports").with_children(reports.iter().map(|(name, path)| {
            Element::new("Report")
                .with_child(Element::leaf("ReportName", *name))
                .with_child(Element::leaf("ReportPath", *path))
        }));
        body(
            Element::new("GetReportListResponse").with_child(
                Element::new("GetReportListResult")
                    .with_child(Element::leaf("Status", "Success"))
                    .with_child(list),
            ),
        )
    }

    /// `ExecuteReport` with the given key and status.
    pub fn execute(report_key: &str, status: &str) -> SoapResponse {
        body(
            Element::new("ExecuteReportResponse").with_child(
                Element::new("ExecuteReportResult")
                    .with_child(Element::leaf("ReportKey", report_key))
                    .with_child(Element::leaf("Status", status)),
            ),
        )
    }

    /// `RetrieveReport` with the status in the SOAP header and, when given,
    /// the base64-encoded stream in the body.
    pub fn retrieve(status: &str, stream: Option<&str>) -> SoapResponse {
        let header = Element::new("Header").with_child(Element::leaf("Status", status));
        let mut response = Element::new("StreamReportResponse");
        if let Some(text) = stream {
            response =
                response.with_child(Element::leaf("ReportStream", STANDARD.encode(text.as_bytes())));
        }
        SoapResponse::new(header, response)
    }

    /// Directory response `{operation}Response/{operation}Result/Results`.
    pub fn results(operation: &str, items: Vec<Element>) -> SoapResponse {
        body(
            Element::new(format!("{operation}Response")).with_child(
                Element::new(format!("{operation}Result"))
                    .with_child(
                        Element::new("OperationResult").with_child(Element::leaf("Success", "true")),
                    )
                    .with_child(Element::new("Results").with_children(items)),
            ),
        )
    }
}
