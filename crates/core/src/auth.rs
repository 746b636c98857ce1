//! Auth Manager
//!
//! `Authenticate` on `LoginService` exchanges the four raw credentials
//! (sent as SOAP header blocks) for a session token. The token and the
//! client access key then form the signed header attached to every
//! directory call.

use std::fmt;

use tracing::{info, instrument};
use ultipro_domain::constants::{
    CONTRACT_LOGIN, NS_CLIENT_ACCESS_KEY, NS_CONTRACTS, NS_LOGIN, NS_ULTIPRO_TOKEN, SERVICE_LOGIN,
};
use ultipro_domain::{Credentials, Element, Result, UltiProError};

use crate::client::{Idempotency, UltiProClient};
use crate::ports::SoapCall;

/// Token and client access key attached to authenticated calls.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeader {
    token: String,
    client_access_key: String,
}

impl SignedHeader {
    pub fn new(token: impl Into<String>, client_access_key: impl Into<String>) -> Self {
        Self { token: token.into(), client_access_key: client_access_key.into() }
    }

    /// The two SOAP header blocks: `UltiProToken` and `ClientAccessKey`.
    pub fn to_elements(&self) -> Vec<Element> {
        vec![
            Element::qualified("UltiProToken", NS_ULTIPRO_TOKEN).with_text(&self.token),
            Element::qualified("ClientAccessKey", NS_CLIENT_ACCESS_KEY)
                .with_text(&self.client_access_key),
        ]
    }
}

impl fmt::Debug for SignedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedHeader")
            .field("token", &"<redacted>")
            .field("client_access_key", &"<redacted>")
            .finish()
    }
}

/// Result of a successful `authenticate`. Valid until the next one; expiry
/// is not tracked.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    signed_header: SignedHeader,
}

impl Session {
    pub fn new(token: impl Into<String>, client_access_key: &str) -> Self {
        let token = token.into();
        let signed_header = SignedHeader::new(token.clone(), client_access_key);
        Self { token, signed_header }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn signed_header(&self) -> &SignedHeader {
        &self.signed_header
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

/// Raw credential header blocks for `Authenticate`.
fn login_headers(credentials: &Credentials) -> Vec<Element> {
    [
        ("UserName", credentials.username()),
        ("Password", credentials.password()),
        ("ClientAccessKey", credentials.client_access_key()),
        ("UserAccessKey", credentials.user_access_key()),
    ]
    .into_iter()
    .map(|(name, value)| Element::qualified(name, NS_LOGIN).with_text(value))
    .collect()
}

/// Token from a `TokenResponse`, or an `Auth` error carrying the server's
/// status message.
fn token_from_response(body: &Element) -> Result<String> {
    let status = body.find("Status").and_then(Element::text);
    if let Some(status) = status {
        if !status.eq_ignore_ascii_case("Ok") && !status.eq_ignore_ascii_case("Success") {
            let message = body.find("StatusMessage").and_then(Element::text).unwrap_or("no message");
            return Err(UltiProError::Auth(format!("login rejected ({status}): {message}")));
        }
    }
    body.find("Token")
        .and_then(Element::text)
        .map(str::to_string)
        .ok_or_else(|| UltiProError::Auth("Authenticate response did not contain a token".into()))
}

impl UltiProClient {
    /// Log in with the configured credentials and store the session.
    ///
    /// The previous session, if any, is kept when the call fails.
    ///
    /// # Errors
    /// Transport and HTTP errors propagate after the retry budget;
    /// `UltiProError::Auth` when the server rejects the login or returns no
    /// token.
    #[instrument(skip(self), fields(username = self.config().credentials.username()))]
    pub async fn authenticate(&mut self) -> Result<()> {
        let credentials = &self.config().credentials;
        let call = SoapCall::new(
            SERVICE_LOGIN,
            NS_LOGIN,
            CONTRACT_LOGIN,
            "Authenticate",
            Element::qualified("TokenRequest", NS_CONTRACTS),
        )
        .with_headers(login_headers(credentials));

        let response = self.call(&call, Idempotency::Idempotent).await?;
        let token = token_from_response(&response.body)?;
        let session = Session::new(token, self.config().credentials.client_access_key());
        self.set_session(session);
        info!("Authenticated against LoginService");
        Ok(())
    }

    /// Signed header blocks for an authenticated call.
    pub(crate) fn signed_headers(&self, operation: &str) -> Result<Vec<Element>> {
        Ok(self.require_session(operation)?.signed_header().to_elements())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{config, responses, ScriptedTransport};

    #[tokio::test]
    async fn authenticate_sends_raw_credentials_and_stores_session() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push("Authenticate", responses::token("tok-123"));
        let mut client = UltiProClient::new(config(), transport.clone()).unwrap();

        client.authenticate().await.unwrap();

        let session = client.session().unwrap();
        assert_eq!(session.token(), "tok-123");
        let sent = transport.last_call("Authenticate").unwrap();
        assert_eq!(sent.service, "LoginService");
        let names: Vec<_> = sent.headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["UserName", "Password", "ClientAccessKey", "UserAccessKey"]);
        assert_eq!(sent.headers[0].text(), Some("svc-user"));
        assert_eq!(sent.headers[3].text(), Some("UAK01"));
    }

    #[tokio::test]
    async fn signed_header_carries_token_and_client_access_key() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push("Authenticate", responses::token("tok-9"));
        let mut client = UltiProClient::new(config(), transport).unwrap();
        client.authenticate().await.unwrap();

        let headers = client.signed_headers("FindPeople").unwrap();

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].name, "UltiProToken");
        assert_eq!(headers[0].namespace.as_deref(), Some(NS_ULTIPRO_TOKEN));
        assert_eq!(headers[0].text(), Some("tok-9"));
        assert_eq!(headers[1].name, "ClientAccessKey");
        assert_eq!(headers[1].text(), Some("CAK01"));
    }

    #[tokio::test]
    async fn missing_token_is_an_auth_error_and_leaves_client_unauthenticated() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push("Authenticate", responses::body(Element::new("TokenResponse")));
        let mut client = UltiProClient::new(config(), transport).unwrap();

        let err = client.authenticate().await.unwrap_err();

        assert!(matches!(err, UltiProError::Auth(_)));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn rejected_login_reports_status_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push(
            "Authenticate",
            responses::body(
                Element::new("TokenResponse")
                    .with_child(Element::leaf("Status", "Failed"))
                    .with_child(Element::leaf("StatusMessage", "Invalid user")),
            ),
        );
        let mut client = UltiProClient::new(config(), transport).unwrap();

        let err = client.authenticate().await.unwrap_err();

        assert_eq!(err, UltiProError::Auth("login rejected (Failed): Invalid user".into()));
    }

    #[test]
    fn debug_output_redacts_token() {
        let session = Session::new("very-secret", "CAK01");
        let rendered = format!("{session:?} {:?}", session.signed_header());
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("CAK01"));
    }
}
