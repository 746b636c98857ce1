//! Wire and configuration constants
//!
//! Centralized location for the service names, XML namespaces, SOAP actions
//! and environment keys used by the client.

// Endpoint configuration
pub const DEFAULT_BASE_URL: &str = "https://service4.ultipro.com/services/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// Environment keys (read only at the configuration boundary)
pub const ENV_USERNAME: &str = "UKG_UserName";
pub const ENV_PASSWORD: &str = "UKG_Password";
pub const ENV_CLIENT_ACCESS_KEY: &str = "UKG_ClientAccessKey";
pub const ENV_USER_ACCESS_KEY: &str = "UKG_UserAccessKey";
pub const ENV_BASE_URL: &str = "UKG_BaseUrl";
pub const ENV_TIMEOUT_SECS: &str = "UKG_TimeoutSecs";
pub const ENV_POLL_INTERVAL_SECS: &str = "UKG_PollIntervalSecs";
pub const ENV_POLL_MAX_ATTEMPTS: &str = "UKG_PollMaxAttempts";
pub const ENV_RETRY_MAX_ATTEMPTS: &str = "UKG_RetryMaxAttempts";

// Report polling (≈15 minutes ceiling)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;

// Outbound call retry
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 8;
pub const DEFAULT_RETRY_INITIAL_DELAY_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_DELAY_SECS: u64 = 60;

// Report stream formatting
pub const DEFAULT_DELIMITER: char = ',';
pub const DELIMITER_HTTP_HEADER: &str = "US-DELIMITER";

// SOAP envelope namespaces
pub const NS_SOAP_ENVELOPE: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const NS_ADDRESSING: &str = "http://www.w3.org/2005/08/addressing";

// Signed header element namespaces
pub const NS_ULTIPRO_TOKEN: &str =
    "http://www.ultimatesoftware.com/foundation/authentication/ultiprotoken";
pub const NS_CLIENT_ACCESS_KEY: &str =
    "http://www.ultimatesoftware.com/foundation/authentication/clientaccesskey";

// Service namespaces
pub const NS_LOGIN: &str = "http://www.ultipro.com/services/loginservice";
pub const NS_EMPLOYEE_PERSON: &str = "http://www.ultipro.com/services/employeeperson";
pub const NS_EMPLOYEE_GLOBAL: &str = "http://www.ultipro.com/services/employeeglobal";
pub const NS_CONTRACTS: &str = "http://www.ultipro.com/contracts";
pub const NS_BI_DATA: &str = "http://www.ultipro.com/dataservices/bidata/2";
pub const NS_BI_STREAM: &str = "http://www.ultipro.com/dataservices/bistream/2";

// Service endpoints, relative to the base URL
pub const SERVICE_LOGIN: &str = "LoginService";
pub const SERVICE_EMPLOYEE_PERSON: &str = "EmployeePerson";
pub const SERVICE_EMPLOYEE_GLOBAL: &str = "EmployeeGlobal";
pub const SERVICE_BI_DATA: &str = "BiDataService";
pub const SERVICE_BI_STREAMING: &str = "BiStreamingService";

// Service contracts, used to build SOAP actions as `{namespace}/{contract}/{operation}`
pub const CONTRACT_LOGIN: &str = "ILoginService";
pub const CONTRACT_EMPLOYEE_PERSON: &str = "IEmployeePerson";
pub const CONTRACT_EMPLOYEE_GLOBAL: &str = "IEmployeeGlobal";
pub const CONTRACT_BI_DATA: &str = "IBIDataService";
pub const CONTRACT_BI_STREAM: &str = "IBIStreamService";

// Prefixes declared on every request envelope. Attribute values such as
// `xsi:type` references rely on them.
pub const NS_XML_SCHEMA_INSTANCE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const PREFIX_XML_SCHEMA_INSTANCE: &str = "i";
pub const PREFIX_CONTRACTS: &str = "b";
pub const XSI_TYPE_ATTRIBUTE: &str = "i:type";
