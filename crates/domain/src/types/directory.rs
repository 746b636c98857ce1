//! Employee directory identifiers and queries

use serde::{Deserialize, Serialize};

/// Typed identifier accepted by the person and global-employee lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeIdentifier {
    EmployeeNumber { number: String, company_code: Option<String> },
    EmailAddress(String),
}

impl EmployeeIdentifier {
    pub fn employee_number(number: impl Into<String>) -> Self {
        Self::EmployeeNumber { number: number.into(), company_code: None }
    }

    pub fn email_address(address: impl Into<String>) -> Self {
        Self::EmailAddress(address.into())
    }

    /// Name of the concrete identifier type on the wire (`xsi:type`).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::EmployeeNumber { .. } => "EmployeeNumberIdentifier",
            Self::EmailAddress(_) => "EmailAddressIdentifier",
        }
    }
}

/// Filter sent to `FindPeople`. Unset fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonQuery {
    pub company_code: Option<String>,
    pub employee_number: Option<String>,
    pub email_address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl PersonQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    #[must_use]
    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    #[must_use]
    pub fn email_address(mut self, value: impl Into<String>) -> Self {
        self.email_address = Some(value.into());
        self
    }

    #[must_use]
    pub fn employee_number(mut self, value: impl Into<String>) -> Self {
        self.employee_number = Some(value.into());
        self
    }

    #[must_use]
    pub fn company_code(mut self, value: impl Into<String>) -> Self {
        self.company_code = Some(value.into());
        self
    }

    #[must_use]
    pub fn status(mut self, value: impl Into<String>) -> Self {
        self.status = Some(value.into());
        self
    }

    #[must_use]
    pub fn page(mut self, number: u32, size: u32) -> Self {
        self.page_number = Some(number);
        self.page_size = Some(size);
        self
    }

    /// Whether no filter is set at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
