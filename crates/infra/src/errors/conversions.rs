//! Conversions from external infrastructure errors into domain errors.

use std::io::Error as IoError;

use quick_xml::events::attributes::AttrError;
use quick_xml::Error as XmlError;
use reqwest::Error as HttpError;
use ultipro_domain::UltiProError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub UltiProError);

impl From<InfraError> for UltiProError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<UltiProError> for InfraError {
    fn from(value: UltiProError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoUltiProError {
    fn into_ultipro(self) -> UltiProError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → UltiProError */
/* -------------------------------------------------------------------------- */

impl IntoUltiProError for HttpError {
    fn into_ultipro(self) -> UltiProError {
        if self.is_timeout() {
            return UltiProError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return UltiProError::Network(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            return UltiProError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
        }

        if self.is_builder() {
            return UltiProError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        UltiProError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_ultipro())
    }
}

/* -------------------------------------------------------------------------- */
/* quick_xml::Error → UltiProError */
/* -------------------------------------------------------------------------- */

impl IntoUltiProError for XmlError {
    fn into_ultipro(self) -> UltiProError {
        UltiProError::InvalidResponse(format!("malformed XML: {self}"))
    }
}

impl From<XmlError> for InfraError {
    fn from(value: XmlError) -> Self {
        InfraError(value.into_ultipro())
    }
}

impl From<AttrError> for InfraError {
    fn from(value: AttrError) -> Self {
        InfraError(UltiProError::InvalidResponse(format!("malformed XML attribute: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* csv::Error / std::io::Error → UltiProError */
/* -------------------------------------------------------------------------- */

impl IntoUltiProError for csv::Error {
    fn into_ultipro(self) -> UltiProError {
        match self.into_kind() {
            csv::ErrorKind::Io(err) => err.into_ultipro(),
            other => UltiProError::Io(format!("failed to write delimited file: {other:?}")),
        }
    }
}

impl From<csv::Error> for InfraError {
    fn from(value: csv::Error) -> Self {
        InfraError(value.into_ultipro())
    }
}

impl IntoUltiProError for IoError {
    fn into_ultipro(self) -> UltiProError {
        UltiProError::Io(format!("{} ({:?})", self, self.kind()))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_ultipro())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
