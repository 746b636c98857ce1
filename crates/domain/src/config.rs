//! Client configuration structures
//!
//! These types are plain data: reading them from the environment or from a
//! file happens in `ultipro-infra::config`, never here.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_MAX_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_INITIAL_DELAY_MS, DEFAULT_RETRY_MAX_ATTEMPTS,
    DEFAULT_RETRY_MAX_DELAY_SECS,
};
use crate::errors::{Result, UltiProError};

/// Raw credential fields as they appear in configuration sources.
#[derive(Deserialize)]
struct RawCredentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    client_access_key: String,
    #[serde(default)]
    user_access_key: String,
}

/// Login credentials for the UltiPro web services.
///
/// All four values are mandatory. Instances are immutable once built and
/// only constructed through [`Credentials::new`], so a `Credentials` value is
/// always complete.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCredentials")]
pub struct Credentials {
    username: String,
    password: String,
    client_access_key: String,
    user_access_key: String,
}

impl Credentials {
    /// Build a credential set, rejecting blank values.
    ///
    /// # Errors
    /// Returns `UltiProError::Config` naming the first missing field.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_access_key: impl Into<String>,
        user_access_key: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            username: username.into(),
            password: password.into(),
            client_access_key: client_access_key.into(),
            user_access_key: user_access_key.into(),
        };

        for (field, value) in [
            ("username", &credentials.username),
            ("password", &credentials.password),
            ("client_access_key", &credentials.client_access_key),
            ("user_access_key", &credentials.user_access_key),
        ] {
            if value.trim().is_empty() {
                return Err(UltiProError::Config(format!("missing required credential: {field}")));
            }
        }

        Ok(credentials)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn client_access_key(&self) -> &str {
        &self.client_access_key
    }

    pub fn user_access_key(&self) -> &str {
        &self.user_access_key
    }
}

impl TryFrom<RawCredentials> for Credentials {
    type Error = UltiProError;

    fn try_from(raw: RawCredentials) -> Result<Self> {
        Self::new(raw.username, raw.password, raw.client_access_key, raw.user_access_key)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_access_key", &"<redacted>")
            .field("user_access_key", &"<redacted>")
            .finish()
    }
}

/// Report polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Seconds to wait between two retrieval calls
    pub interval_secs: u64,
    /// Number of re-checks after the first retrieval
    pub max_attempts: u32,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self { interval_secs: DEFAULT_POLL_INTERVAL_SECS, max_attempts: DEFAULT_POLL_MAX_ATTEMPTS }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Retry budget for individual outbound calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts per call (initial try included)
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_secs: u64,
    /// Also retry calls that change server state (`UpdatePerson`,
    /// `UpdateGlobalEmployee`). Callers enabling this must make those
    /// updates safe to apply twice.
    pub retry_non_idempotent: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            initial_delay_ms: DEFAULT_RETRY_INITIAL_DELAY_MS,
            max_delay_secs: DEFAULT_RETRY_MAX_DELAY_SECS,
            retry_non_idempotent: false,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Complete client configuration passed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub credentials: Credentials,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl ClientConfig {
    /// Configuration with the default endpoint and budgets.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: default_base_url(),
            request_timeout_secs: default_timeout_secs(),
            polling: PollingSettings::default(),
            retry: RetrySettings::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_polling(mut self, polling: PollingSettings) -> Self {
        self.polling = polling;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the values that cannot be enforced by the type system.
    ///
    /// # Errors
    /// Returns `UltiProError::Config` for an unparsable or non-HTTP base URL
    /// and for zero-valued budgets.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| UltiProError::Config(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UltiProError::Config(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(UltiProError::Config("request_timeout_secs must be greater than 0".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(UltiProError::Config("retry.max_attempts must be greater than 0".into()));
        }
        Ok(())
    }

    /// Absolute URL of a service endpoint, tolerating a missing trailing
    /// slash on the base and a leading slash on the service name.
    pub fn service_url(&self, service: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), service.trim_start_matches('/'))
    }
}
