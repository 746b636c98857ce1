//! BI data service: logon, catalog and parameter lookups

use tracing::{debug, instrument};
use ultipro_domain::constants::{CONTRACT_BI_DATA, NS_BI_DATA, SERVICE_BI_DATA};
use ultipro_domain::{
    Element, ExecutionContext, ReportDescriptor, ReportParameter, Result, UltiProError,
};

use crate::client::{Idempotency, UltiProClient};
use crate::ports::SoapCall;

/// Fail when a BI result carries a non-success `Status`.
pub(crate) fn ensure_bi_success(operation: &str, result: &Element) -> Result<()> {
    match result.child_text("Status") {
        Some(status) if !is_success(status) => {
            let message = result.child_text("StatusMessage").unwrap_or("no message");
            Err(UltiProError::InvalidResponse(format!("{operation} returned {status}: {message}")))
        }
        _ => Ok(()),
    }
}

fn is_success(status: &str) -> bool {
    status.eq_ignore_ascii_case("Ok") || status.eq_ignore_ascii_case("Success")
}

/// `{operation}Result` inside the response body.
pub(crate) fn operation_result<'a>(operation: &str, body: &'a Element) -> Result<&'a Element> {
    let name = format!("{operation}Result");
    body.find(&name)
        .ok_or_else(|| UltiProError::InvalidResponse(format!("{operation}: missing {name}")))
}

pub(crate) fn bi_call(operation: &'static str, arguments: Vec<Element>) -> SoapCall {
    let body = Element::qualified(operation, NS_BI_DATA).with_children(arguments);
    SoapCall::new(SERVICE_BI_DATA, NS_BI_DATA, CONTRACT_BI_DATA, operation, body)
}

fn flag(element: &Element, name: &str) -> bool {
    element.child_text(name).is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn parse_parameter(element: &Element) -> Option<ReportParameter> {
    Some(ReportParameter {
        name: element.child_text("Name")?.to_string(),
        data_type: element.child_text("DataType").map(str::to_string),
        required: flag(element, "Required"),
        multi_value: flag(element, "MultiValued"),
        default_value: element.child_text("DefaultValue").map(str::to_string),
    })
}

impl UltiProClient {
    /// Obtain a fresh execution context for the BI services.
    ///
    /// # Errors
    /// `UltiProError::Auth` before `authenticate` or when the logon is
    /// rejected.
    #[instrument(skip(self))]
    pub async fn log_on_with_token(&self) -> Result<ExecutionContext> {
        let operation = "LogOnWithToken";
        let session = self.require_session(operation)?;
        let request = Element::qualified("logOnRequest", NS_BI_DATA)
            .with_child(Element::leaf("Token", session.token()))
            .with_child(Element::leaf(
                "ClientAccessKey",
                self.config().credentials.client_access_key(),
            ));

        let response = self.call(&bi_call(operation, vec![request]), Idempotency::Idempotent).await?;
        let result = operation_result(operation, &response.body)?;
        if let Some(status) = result.child_text("Status") {
            if !is_success(status) {
                let message = result.child_text("StatusMessage").unwrap_or("no message");
                return Err(UltiProError::Auth(format!("BI logon rejected ({status}): {message}")));
            }
        }
        debug!("Obtained BI execution context");
        Ok(ExecutionContext::new(result.clone()))
    }

    /// Full report catalog visible to `context`.
    #[instrument(skip(self, context))]
    pub async fn get_report_list(&self, context: &ExecutionContext) -> Result<Vec<ReportDescriptor>> {
        let operation = "GetReportList";
        let call = bi_call(operation, vec![context.as_argument("context")]);

        let response = self.call(&call, Idempotency::Idempotent).await?;
        let result = operation_result(operation, &response.body)?;
        ensure_bi_success(operation, result)?;
        let reports = result
            .find("Reports")
            .map(|reports| {
                reports
                    .children_named("Report")
                    .filter_map(|r| {
                        Some(ReportDescriptor {
                            name: r.child_text("ReportName")?.to_string(),
                            path: r.child_text("ReportPath")?.to_string(),
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        debug!(reports = reports.len(), "Fetched report catalog");
        Ok(reports)
    }

    /// Path of the first catalog entry named exactly `report_name`.
    ///
    /// # Errors
    /// `UltiProError::ReportNotFound` when no entry matches.
    #[instrument(skip(self))]
    pub async fn get_report_path_by_name(&self, report_name: &str) -> Result<String> {
        let context = self.log_on_with_token().await?;
        let reports = self.get_report_list(&context).await?;
        reports
            .into_iter()
            .find(|r| r.name == report_name)
            .map(|r| r.path)
            .ok_or_else(|| UltiProError::ReportNotFound(report_name.to_string()))
    }

    /// Input parameters of the report at `report_path`.
    #[instrument(skip(self))]
    pub async fn get_report_parameters(&self, report_path: &str) -> Result<Vec<ReportParameter>> {
        let operation = "GetReportParameters";
        let context = self.log_on_with_token().await?;
        let call = bi_call(
            operation,
            vec![
                Element::qualified("reportPath", NS_BI_DATA).with_text(report_path),
                context.as_argument("context"),
            ],
        );

        let response = self.call(&call, Idempotency::Idempotent).await?;
        let result = operation_result(operation, &response.body)?;
        ensure_bi_success(operation, result)?;
        Ok(result
            .find("ReportParameters")
            .map(|list| list.children_named("ReportParameter").filter_map(parse_parameter).collect())
            .unwrap_or_default())
    }
}
