//! HTTP transport against a mock UltiPro endpoint
//!
//! Exercises the full client stack: envelope writing, HTTP, response
//! parsing, retry and polling.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ultipro_common::testing::MockSleeper;
use ultipro_core::UltiProClient;
use ultipro_domain::{ClientConfig, Credentials, EmployeeIdentifier, UltiProError};
use ultipro_infra::HttpSoapTransport;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(header: &str, body: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing"><s:Header>{header}</s:Header><s:Body>{body}</s:Body></s:Envelope>"#
    )
}

fn soap_ok(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/soap+xml; charset=utf-8")
        .set_body_string(envelope("", body))
}

fn token_response() -> ResponseTemplate {
    soap_ok(
        r#"<TokenResponse xmlns="http://www.ultipro.com/services/loginservice"><Status>Ok</Status><StatusMessage i:nil="true" xmlns:i="http://www.w3.org/2001/XMLSchema-instance"/><Token>tok-1</Token></TokenResponse>"#,
    )
}

fn log_on_response() -> ResponseTemplate {
    soap_ok(
        r#"<LogOnWithTokenResponse xmlns="http://www.ultipro.com/dataservices/bidata/2"><LogOnWithTokenResult><ClientAccessKey>CAK01</ClientAccessKey><InstanceKey>inst-1</InstanceKey><Status>Ok</Status></LogOnWithTokenResult></LogOnWithTokenResponse>"#,
    )
}

fn retrieve_response(status: &str, stream: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(envelope(
        &format!(r#"<h:Status xmlns:h="http://www.ultipro.com/dataservices/bistream/2">{status}</h:Status>"#),
        &format!(
            r#"<StreamReportResponse xmlns="http://www.ultipro.com/dataservices/bistream/2"><ReportStream>{}</ReportStream></StreamReportResponse>"#,
            STANDARD.encode(stream)
        ),
    ))
}

fn config(server: &MockServer) -> ClientConfig {
    let credentials = Credentials::new("svc-user", "s3cret", "CAK01", "UAK01").unwrap();
    ClientConfig::new(credentials).with_base_url(format!("{}/services/", server.uri()))
}

fn client(config: ClientConfig, sleeper: &MockSleeper) -> UltiProClient {
    let transport = Arc::new(HttpSoapTransport::new(&config).unwrap());
    UltiProClient::new(config, transport).unwrap().with_sleeper(Arc::new(sleeper.clone())).unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/services/LoginService"))
        .and(body_string_contains("ILoginService/Authenticate"))
        .and(body_string_contains("<UserName xmlns=\"http://www.ultipro.com/services/loginservice\">svc-user</UserName>"))
        .respond_with(token_response())
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_report_workflow_over_http() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/BiDataService"))
        .and(body_string_contains("IBIDataService/LogOnWithToken"))
        .respond_with(log_on_response())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/BiDataService"))
        .and(body_string_contains("IBIDataService/GetReportList"))
        .respond_with(soap_ok(
            r#"<GetReportListResponse xmlns="http://www.ultipro.com/dataservices/bidata/2"><GetReportListResult><Reports><Report><ReportName>Headcount</ReportName><ReportPath>/content/headcount</ReportPath></Report></Reports><Status>Success</Status></GetReportListResult></GetReportListResponse>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/BiDataService"))
        .and(body_string_contains("IBIDataService/ExecuteReport"))
        .and(header("US-DELIMITER", ";"))
        .and(body_string_contains("<ReportPath>/content/headcount</ReportPath>"))
        .respond_with(soap_ok(
            r#"<ExecuteReportResponse xmlns="http://www.ultipro.com/dataservices/bidata/2"><ExecuteReportResult><ReportKey>key-42</ReportKey><Status>Success</Status></ExecuteReportResult></ExecuteReportResponse>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/BiStreamingService"))
        .and(body_string_contains("<ReportKey xmlns=\"http://www.ultipro.com/dataservices/bistream/2\">key-42</ReportKey>"))
        .respond_with(retrieve_response("Working", ""))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/BiStreamingService"))
        .respond_with(retrieve_response("Completed", r"Name;City\r\nAnn;Tampa\r\n"))
        .mount(&server)
        .await;

    let sleeper = MockSleeper::new();
    let mut client = client(config(&server), &sleeper);
    client.authenticate().await.unwrap();

    let rows = client.execute_and_retrieve_report("Headcount", ';').await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Name"), Some("Ann"));
    assert_eq!(rows[0].get("City"), Some("Tampa"));
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(30)]);
}

#[tokio::test]
async fn test_intermittent_405_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/LoginService"))
        .respond_with(ResponseTemplate::new(405).set_body_string("<html>Method Not Allowed</html>"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_login(&server).await;

    let sleeper = MockSleeper::new();
    let mut client = client(config(&server), &sleeper);
    client.authenticate().await.unwrap();

    assert!(client.is_authenticated());
    assert_eq!(sleeper.count(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_soap_fault_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/LoginService"))
        .respond_with(ResponseTemplate::new(500).set_body_string(envelope(
            "",
            r#"<s:Fault><s:Code><s:Value>s:Sender</s:Value></s:Code><s:Reason><s:Text xml:lang="en-US">Invalid user name or password</s:Text></s:Reason></s:Fault>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = MockSleeper::new();
    let mut client = client(config(&server), &sleeper);
    let err = client.authenticate().await.unwrap_err();

    assert_eq!(err, UltiProError::SoapFault("s:Sender: Invalid user name or password".into()));
    assert!(!client.is_authenticated());
    assert_eq!(sleeper.count(), 0);
}

#[tokio::test]
async fn test_person_lookup_sends_signed_header_and_typed_identifier() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/services/EmployeePerson"))
        .and(body_string_contains("IEmployeePerson/GetPersonByEmployeeIdentifier"))
        .and(body_string_contains(
            "<UltiProToken xmlns=\"http://www.ultimatesoftware.com/foundation/authentication/ultiprotoken\">tok-1</UltiProToken>",
        ))
        .and(body_string_contains("i:type=\"b:EmailAddressIdentifier\""))
        .respond_with(soap_ok(
            r#"<GetPersonByEmployeeIdentifierResponse xmlns="http://www.ultipro.com/services/employeeperson"><GetPersonByEmployeeIdentifierResult xmlns:b="http://www.ultipro.com/contracts"><b:OperationResult><b:Success>true</b:Success></b:OperationResult><b:Results><b:EmployeePerson><b:FirstName>Jane</b:FirstName><b:LastName>Doe</b:LastName></b:EmployeePerson></b:Results></GetPersonByEmployeeIdentifierResult></GetPersonByEmployeeIdentifierResponse>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let sleeper = MockSleeper::new();
    let mut client = client(config(&server), &sleeper);
    client.authenticate().await.unwrap();

    let people = client
        .get_person(&EmployeeIdentifier::email_address("jane@example.com"))
        .await
        .unwrap();

    assert_eq!(people.len(), 1);
    assert_eq!(people[0].child_text("FirstName"), Some("Jane"));
}
