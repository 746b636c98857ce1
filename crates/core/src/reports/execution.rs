//! Report execution request

use tracing::{info, instrument};
use ultipro_domain::constants::{DELIMITER_HTTP_HEADER, NS_BI_DATA};
use ultipro_domain::{Element, ReportKey, ReportStatus, Result, UltiProError};

use super::catalog::{bi_call, operation_result};
use crate::client::{Idempotency, UltiProClient};

impl UltiProClient {
    /// Start generating the report at `report_path` with a fresh execution
    /// context. The delimiter travels in the `US-DELIMITER` HTTP header.
    ///
    /// # Errors
    /// `UltiProError::ReportGeneration` when the service reports the
    /// execution as failed; `UltiProError::InvalidResponse` when no report
    /// key comes back.
    #[instrument(skip(self))]
    pub async fn execute_report(&self, report_path: &str, delimiter: char) -> Result<ReportKey> {
        let operation = "ExecuteReport";
        let context = self.log_on_with_token().await?;
        let request = Element::qualified("request", NS_BI_DATA)
            .with_child(Element::leaf("ReportPath", report_path));
        let call = bi_call(operation, vec![request, context.as_argument("context")])
            .with_http_header(DELIMITER_HTTP_HEADER, delimiter.to_string());

        let response = self.call(&call, Idempotency::Idempotent).await?;
        let result = operation_result(operation, &response.body)?;
        let report_key = result.child_text("ReportKey");

        if let Some(status) = result.child_text("Status") {
            if ReportStatus::from_wire(status) == ReportStatus::Failed {
                let message = result.child_text("StatusMessage").unwrap_or_default();
                let status =
                    if message.is_empty() { status.to_string() } else { format!("{status}: {message}") };
                return Err(UltiProError::ReportGeneration {
                    report_key: report_key.unwrap_or_default().to_string(),
                    status,
                });
            }
        }

        let report_key = report_key.map(ReportKey::new).ok_or_else(|| {
            UltiProError::InvalidResponse(format!("{operation}: missing ReportKey"))
        })?;
        info!(report_key = %report_key, "Report execution requested");
        Ok(report_key)
    }
}
