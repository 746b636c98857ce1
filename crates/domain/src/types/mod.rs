//! Domain types and models

pub mod directory;
pub mod element;
pub mod record;
pub mod report;

pub use directory::{EmployeeIdentifier, PersonQuery};
pub use element::Element;
pub use record::RowRecord;
pub use report::{ExecutionContext, ReportDescriptor, ReportKey, ReportParameter, ReportStatus};
