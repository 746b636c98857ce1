//! The UltiPro client facade
//!
//! [`UltiProClient`] owns the configuration, the transport, the session
//! produced by `authenticate` and the retry policy object that wraps every
//! outbound call. Operation groups (auth, directory, reports) are implemented
//! as `impl` blocks in their own modules.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use ultipro_common::policies::PredicateRetry;
use ultipro_common::{RetryConfig, RetryError, RetryExecutor, Sleeper, TokioSleeper};
use ultipro_domain::{ClientConfig, Result, RetrySettings, UltiProError};

use crate::auth::Session;
use crate::ports::{SoapCall, SoapResponse, SoapTransport};

/// Retry predicate applied to outbound calls.
pub(crate) type CallRetryPolicy = PredicateRetry<fn(&UltiProError, u32) -> bool>;

fn is_retryable(error: &UltiProError, _attempt: u32) -> bool {
    error.is_transient()
}

/// Whether repeating a call can change server state twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idempotency {
    /// Reads and report workflow calls; always wrapped by the retry policy
    Idempotent,
    /// Updates; sent once unless `retry_non_idempotent` is enabled
    NonIdempotent,
}

/// Authenticated client for the UltiPro SOAP services.
///
/// One workflow at a time: `authenticate` takes `&mut self`, every other
/// operation `&self`.
pub struct UltiProClient {
    config: ClientConfig,
    transport: Arc<dyn SoapTransport>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryExecutor<CallRetryPolicy>,
    session: Option<Session>,
}

impl fmt::Debug for UltiProClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UltiProClient")
            .field("config", &self.config)
            .field("authenticated", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

impl UltiProClient {
    /// Create a client. No remote call is made.
    ///
    /// # Errors
    /// Returns `UltiProError::Config` when the configuration is invalid.
    pub fn new(config: ClientConfig, transport: Arc<dyn SoapTransport>) -> Result<Self> {
        config.validate()?;
        if config.retry.retry_non_idempotent {
            warn!(
                "Retries enabled for non-idempotent updates; callers must make repeated \
                 UpdatePerson/UpdateGlobalEmployee requests safe"
            );
        }
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        let retry = build_retry_executor(&config.retry, Arc::clone(&sleeper))?;
        Ok(Self { config, transport, sleeper, retry, session: None })
    }

    /// Replace the sleeper used for retry backoff and report polling.
    ///
    /// # Errors
    /// Returns `UltiProError::Config` when the retry settings are invalid.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        self.retry = build_retry_executor(&self.config.retry, Arc::clone(&sleeper))?;
        self.sleeper = sleeper;
        Ok(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Current session, present after a successful `authenticate`.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Session or an `Auth` error naming the operation that needed it.
    pub(crate) fn require_session(&self, operation: &str) -> Result<&Session> {
        self.session.as_ref().ok_or_else(|| {
            UltiProError::Auth(format!("{operation} requires authenticate() to be called first"))
        })
    }

    /// Send one call through the transport, wrapped by the retry policy when
    /// the call may be repeated.
    pub(crate) async fn call(&self, call: &SoapCall, idempotency: Idempotency) -> Result<SoapResponse> {
        let retried = match idempotency {
            Idempotency::Idempotent => true,
            Idempotency::NonIdempotent => self.config.retry.retry_non_idempotent,
        };
        debug!(service = call.service, operation = call.operation, retried, "Invoking SOAP operation");

        if !retried {
            return self.transport.invoke(call).await;
        }

        self.retry.execute(|| self.transport.invoke(call)).await.map_err(|err| {
            let error = into_call_error(err);
            warn!(operation = call.operation, error = %error, kind = error.label(), "SOAP operation failed");
            error
        })
    }
}

fn build_retry_executor(
    settings: &RetrySettings,
    sleeper: Arc<dyn Sleeper>,
) -> Result<RetryExecutor<CallRetryPolicy>> {
    let config = RetryConfig::builder()
        .max_attempts(settings.max_attempts)
        .exponential_backoff(
            Duration::from_millis(settings.initial_delay_ms),
            2.0,
            Duration::from_secs(settings.max_delay_secs),
        )
        .full_jitter()
        .build()
        .map_err(|e| UltiProError::Config(e.to_string()))?;
    let policy: CallRetryPolicy =
        PredicateRetry::new(is_retryable as fn(&UltiProError, u32) -> bool);
    Ok(RetryExecutor::new(config, policy).with_sleeper(sleeper))
}

/// The underlying call error; the retry wrapper never hides it.
fn into_call_error(err: RetryError<UltiProError>) -> UltiProError {
    err.into_source()
}

#[cfg(test)]
mod tests {
    use ultipro_common::testing::MockSleeper;
    use ultipro_domain::Element;

    use super::*;
    use crate::testing::{config, ScriptedTransport};

    fn call() -> SoapCall {
        SoapCall::new("EmployeePerson", "ns", "IEmployeePerson", "FindPeople", Element::new("FindPeople"))
    }

    fn http(status: u16) -> UltiProError {
        UltiProError::Http { status, message: "intermittent".into() }
    }

    #[test]
    fn rejects_invalid_config() {
        let bad = config().with_base_url("ftp://example.com");
        let err = UltiProClient::new(bad, Arc::new(ScriptedTransport::new())).unwrap_err();
        assert!(matches!(err, UltiProError::Config(_)));
    }

    #[test]
    fn zero_attempt_budget_is_a_config_error() {
        let settings = RetrySettings { max_attempts: 0, ..RetrySettings::default() };
        let err = build_retry_executor(&settings, Arc::new(MockSleeper::new())).unwrap_err();
        match err {
            UltiProError::Config(message) => assert!(message.contains("max_attempts")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn starts_unauthenticated() {
        let client = UltiProClient::new(config(), Arc::new(ScriptedTransport::new())).unwrap();
        assert!(!client.is_authenticated());
        assert!(matches!(client.require_session("FindPeople"), Err(UltiProError::Auth(_))));
    }

    #[tokio::test]
    async fn transient_failures_below_budget_recover() {
        let transport = Arc::new(ScriptedTransport::new());
        for _ in 0..7 {
            transport.push_error("FindPeople", http(405));
        }
        transport.push("FindPeople", SoapResponse::with_body(Element::new("FindPeopleResponse")));
        let sleeper = MockSleeper::new();
        let client = UltiProClient::new(config(), transport.clone())
            .unwrap()
            .with_sleeper(Arc::new(sleeper.clone()))
            .unwrap();

        let response = client.call(&call(), Idempotency::Idempotent).await.unwrap();

        assert_eq!(response.body.name, "FindPeopleResponse");
        assert_eq!(transport.calls_to("FindPeople"), 8);
        assert_eq!(sleeper.count(), 7);
    }

    #[tokio::test]
    async fn eight_consecutive_failures_propagate_last_error() {
        let transport = Arc::new(ScriptedTransport::new());
        for _ in 0..7 {
            transport.push_error("FindPeople", http(405));
        }
        transport.push_error("FindPeople", http(503));
        transport.push("FindPeople", SoapResponse::with_body(Element::new("unreached")));
        let client = UltiProClient::new(config(), transport.clone())
            .unwrap()
            .with_sleeper(Arc::new(MockSleeper::new()))
            .unwrap();

        let err = client.call(&call(), Idempotency::Idempotent).await.unwrap_err();

        assert_eq!(err, http(503));
        assert_eq!(transport.calls_to("FindPeople"), 8);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error("FindPeople", UltiProError::SoapFault("a:AccessDenied".into()));
        let sleeper = MockSleeper::new();
        let client = UltiProClient::new(config(), transport.clone())
            .unwrap()
            .with_sleeper(Arc::new(sleeper.clone()))
            .unwrap();

        let err = client.call(&call(), Idempotency::Idempotent).await.unwrap_err();

        assert!(matches!(err, UltiProError::SoapFault(_)));
        assert_eq!(transport.calls_to("FindPeople"), 1);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn non_idempotent_calls_are_sent_once_by_default() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error("FindPeople", http(405));
        let client = UltiProClient::new(config(), transport.clone())
            .unwrap()
            .with_sleeper(Arc::new(MockSleeper::new()))
            .unwrap();

        let err = client.call(&call(), Idempotency::NonIdempotent).await.unwrap_err();

        assert_eq!(err, http(405));
        assert_eq!(transport.calls_to("FindPeople"), 1);
    }

    #[tokio::test]
    async fn non_idempotent_retry_is_opt_in() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error("FindPeople", http(405));
        transport.push("FindPeople", SoapResponse::with_body(Element::new("ok")));
        let mut settings = config();
        settings.retry.retry_non_idempotent = true;
        let client = UltiProClient::new(settings, transport.clone())
            .unwrap()
            .with_sleeper(Arc::new(MockSleeper::new()))
            .unwrap();

        client.call(&call(), Idempotency::NonIdempotent).await.unwrap();

        assert_eq!(transport.calls_to("FindPeople"), 2);
    }
}
