//! Report Workflow Engine
//!
//! authenticate → resolve path → execute → poll → decode stream.
//!
//! Every high-level call obtains its own execution context through
//! `LogOnWithToken`; contexts are never cached because the server may
//! invalidate them at any time.

pub mod catalog;
pub mod execution;
pub mod poller;

pub use poller::{ReportPoller, RetrievedReport};
use tracing::{info, instrument};
use ultipro_domain::{Result, RowRecord};

use crate::client::UltiProClient;
use crate::stream::{decode_report_stream, delimiter_byte, parse_report};

impl UltiProClient {
    /// Run the report named `report_name` and return its decoded text.
    ///
    /// # Errors
    /// `ReportNotFound` for an unknown name, `ReportGeneration` when the
    /// report fails or never completes, plus any transport error.
    #[instrument(skip(self))]
    pub async fn execute_and_retrieve_raw_report(
        &self,
        report_name: &str,
        delimiter: char,
    ) -> Result<String> {
        let report_path = self.get_report_path_by_name(report_name).await?;
        let report_key = self.execute_report(&report_path, delimiter).await?;
        let report = self.retrieve_report(&report_key).await?;
        let text = decode_report_stream(&report.stream()?);
        info!(report_key = %report_key, bytes = text.len(), "Retrieved report");
        Ok(text)
    }

    /// Run the report named `report_name` and parse it into rows.
    ///
    /// # Errors
    /// `InvalidInput` for a delimiter the parser cannot use (checked before
    /// any remote call), otherwise as
    /// [`execute_and_retrieve_raw_report`](Self::execute_and_retrieve_raw_report).
    pub async fn execute_and_retrieve_report(
        &self,
        report_name: &str,
        delimiter: char,
    ) -> Result<Vec<RowRecord>> {
        delimiter_byte(delimiter)?;
        let text = self.execute_and_retrieve_raw_report(report_name, delimiter).await?;
        parse_report(&text, delimiter)
    }
}
