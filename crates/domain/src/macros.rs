//! Macro for implementing Display and FromStr for wire status enums
//!
//! UltiPro reports statuses as PascalCase strings (`Working`, `Completed`).
//! This macro keeps the wire spelling for `Display` and parses
//! case-insensitively so that minor casing drift on the server side does not
//! break the polling state machine.
//!
//! # Example
//!
//! ```rust
//! use ultipro_domain::impl_wire_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum JobStatus {
//!     Queued,
//!     Done,
//! }
//!
//! impl_wire_status_conversions!(JobStatus {
//!     Queued => "Queued",
//!     Done => "Done",
//! });
//!
//! assert_eq!(JobStatus::Done.to_string(), "Done");
//! assert_eq!("queued".parse::<JobStatus>().unwrap(), JobStatus::Queued);
//! ```

/// Implements Display and FromStr traits for wire status enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire spelling
#[macro_export]
macro_rules! impl_wire_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
