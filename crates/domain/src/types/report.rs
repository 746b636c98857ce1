//! Report workflow value types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::NS_BI_DATA;
use crate::impl_wire_status_conversions;
use crate::types::element::Element;

/// A report as listed in the BI catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDescriptor {
    pub name: String,
    pub path: String,
}

/// Opaque handle of a server-side report generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportKey(String);

impl ReportKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Report generation status reported by the streaming service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Working,
    Completed,
    Failed,
    /// Any status string the client does not recognise
    Unknown,
}

impl_wire_status_conversions!(ReportStatus {
    Working => "Working",
    Completed => "Completed",
    Failed => "Failed",
    Unknown => "Unknown",
});

impl ReportStatus {
    /// Lenient parse used on responses: unrecognised strings map to
    /// `Unknown` instead of failing.
    pub fn from_wire(value: &str) -> Self {
        value.parse().unwrap_or(Self::Unknown)
    }

    /// Terminal statuses end polling.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Working)
    }
}

/// Authorization context returned by `LogOnWithToken`.
///
/// The content is opaque to the client and is echoed back verbatim on
/// catalog, parameter and execution calls. It may be invalidated server-side
/// at any time, so it is never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext(Element);

impl ExecutionContext {
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &Element {
        &self.0
    }

    /// The context rendered as an operation argument named `name` in the BI
    /// data namespace.
    pub fn as_argument(&self, name: &str) -> Element {
        Element::qualified(name, NS_BI_DATA).with_children(self.0.children.iter().cloned())
    }
}

/// One input parameter of a BI report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParameter {
    pub name: String,
    pub data_type: Option<String>,
    pub required: bool,
    pub multi_value: bool,
    pub default_value: Option<String>,
}
