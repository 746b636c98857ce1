//! Report retrieval and the bounded polling state machine
//!
//! ```text
//!            retrieve                 sleep(interval), retrieve
//!   start ─────────────▶ Working ──────────────────────────────┐
//!                          │  ▲                                 │
//!                          │  └─────────── rechecks < max ◀─────┘
//!                          │
//!                          ├── Completed ─────────────▶ Ok(RetrievedReport)
//!                          ├── Failed / unknown ──────▶ Err(ReportGeneration)
//!                          └── rechecks == max ───────▶ Err(ReportGeneration)
//! ```
//!
//! `max_attempts` counts the re-checks after the first retrieval, so with
//! the defaults at most 30 pauses of 30 seconds happen.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, instrument, warn};
use ultipro_domain::constants::{CONTRACT_BI_STREAM, NS_BI_STREAM, SERVICE_BI_STREAMING};
use ultipro_domain::{Element, PollingSettings, ReportKey, ReportStatus, Result, UltiProError};

use crate::client::{Idempotency, UltiProClient};
use crate::ports::SoapCall;

/// One `RetrieveReport` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedReport {
    pub report_key: ReportKey,
    pub status: ReportStatus,
    /// Status exactly as sent by the server
    pub status_text: String,
    /// Response SOAP header
    pub header: Element,
    /// Response body
    pub body: Element,
}

impl RetrievedReport {
    fn from_response(report_key: &ReportKey, header: Element, body: Element) -> Self {
        let status_text = header
            .find("Status")
            .or_else(|| body.find("Status"))
            .and_then(Element::text)
            .unwrap_or_default()
            .to_string();
        Self {
            report_key: report_key.clone(),
            status: ReportStatus::from_wire(&status_text),
            status_text,
            header,
            body,
        }
    }

    /// Base64-decoded `ReportStream` content.
    ///
    /// # Errors
    /// `UltiProError::InvalidResponse` when the stream element is missing or
    /// not valid base64.
    pub fn stream(&self) -> Result<Vec<u8>> {
        let encoded = self
            .body
            .find("ReportStream")
            .ok_or_else(|| {
                UltiProError::InvalidResponse(format!("report {} has no ReportStream", self.report_key))
            })?
            .text
            .as_deref()
            .unwrap_or_default();
        let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact).map_err(|e| {
            UltiProError::InvalidResponse(format!("report {} stream is not base64: {e}", self.report_key))
        })
    }
}

/// Drives `RetrieveReport` until the report leaves `Working` or the budget
/// runs out. Pauses go through the client's sleeper.
#[derive(Debug)]
pub struct ReportPoller<'a> {
    client: &'a UltiProClient,
    settings: PollingSettings,
}

impl<'a> ReportPoller<'a> {
    pub fn new(client: &'a UltiProClient, settings: PollingSettings) -> Self {
        Self { client, settings }
    }

    /// Poll `report_key` to a terminal state.
    ///
    /// # Errors
    /// `UltiProError::ReportGeneration` carrying the key and last status
    /// when the report fails or is still working after the last re-check;
    /// transport errors from any retrieval propagate.
    #[instrument(skip(self, report_key), fields(report_key = %report_key, max_attempts = self.settings.max_attempts))]
    pub async fn poll(&self, report_key: &ReportKey) -> Result<RetrievedReport> {
        let mut report = self.client.retrieve_report_once(report_key).await?;
        let mut rechecks = 0;

        while !report.status.is_terminal() && rechecks < self.settings.max_attempts {
            debug!(rechecks, status = %report.status_text, "Report still working");
            self.client.sleeper().sleep(self.settings.interval()).await;
            rechecks += 1;
            report = self.client.retrieve_report_once(report_key).await?;
        }

        if report.status == ReportStatus::Completed {
            info!(rechecks, "Report completed");
            return Ok(report);
        }

        warn!(rechecks, status = %report.status_text, "Report did not complete");
        Err(UltiProError::ReportGeneration {
            report_key: report_key.to_string(),
            status: report.status_text,
        })
    }
}

impl UltiProClient {
    /// Single `RetrieveReport` call, no polling.
    pub async fn retrieve_report_once(&self, report_key: &ReportKey) -> Result<RetrievedReport> {
        let call = SoapCall::new(
            SERVICE_BI_STREAMING,
            NS_BI_STREAM,
            CONTRACT_BI_STREAM,
            "RetrieveReport",
            Element::qualified("RetrieveReportRequest", NS_BI_STREAM),
        )
        .with_header(Element::qualified("ReportKey", NS_BI_STREAM).with_text(report_key.as_str()));

        let response = self.call(&call, Idempotency::Idempotent).await?;
        Ok(RetrievedReport::from_response(report_key, response.header, response.body))
    }

    /// Poll `report_key` with the configured polling budget.
    ///
    /// # Errors
    /// See [`ReportPoller::poll`].
    pub async fn retrieve_report(&self, report_key: &ReportKey) -> Result<RetrievedReport> {
        ReportPoller::new(self, self.config().polling).poll(report_key).await
    }
}
