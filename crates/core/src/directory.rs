//! Directory operations on the `EmployeePerson` and `EmployeeGlobal`
//! services.
//!
//! Each operation builds its request, issues one authenticated call and
//! returns the children of the response's `Results` element unmodified.

use tracing::{debug, instrument};
use ultipro_domain::constants::{
    CONTRACT_EMPLOYEE_GLOBAL, CONTRACT_EMPLOYEE_PERSON, NS_CONTRACTS, NS_EMPLOYEE_GLOBAL,
    NS_EMPLOYEE_PERSON, PREFIX_CONTRACTS, SERVICE_EMPLOYEE_GLOBAL, SERVICE_EMPLOYEE_PERSON,
    XSI_TYPE_ATTRIBUTE,
};
use ultipro_domain::{Element, EmployeeIdentifier, PersonQuery, Result, UltiProError};

use crate::client::{Idempotency, UltiProClient};
use crate::ports::SoapCall;

/// The two directory services share request/response conventions.
#[derive(Debug, Clone, Copy)]
struct DirectoryService {
    endpoint: &'static str,
    namespace: &'static str,
    contract: &'static str,
}

const EMPLOYEE_PERSON: DirectoryService = DirectoryService {
    endpoint: SERVICE_EMPLOYEE_PERSON,
    namespace: NS_EMPLOYEE_PERSON,
    contract: CONTRACT_EMPLOYEE_PERSON,
};

const EMPLOYEE_GLOBAL: DirectoryService = DirectoryService {
    endpoint: SERVICE_EMPLOYEE_GLOBAL,
    namespace: NS_EMPLOYEE_GLOBAL,
    contract: CONTRACT_EMPLOYEE_GLOBAL,
};

fn contract_leaf(name: &str, value: &str) -> Element {
    Element::qualified(name, NS_CONTRACTS).with_text(value)
}

/// `<query>` argument of `FindPeople`; unset filters are omitted.
fn query_element(query: &PersonQuery) -> Element {
    let fields = [
        ("CompanyCode", query.company_code.clone()),
        ("EmailAddress", query.email_address.clone()),
        ("EmployeeNumber", query.employee_number.clone()),
        ("FirstName", query.first_name.clone()),
        ("LastName", query.last_name.clone()),
        ("PageNumber", query.page_number.map(|n| n.to_string())),
        ("PageSize", query.page_size.map(|n| n.to_string())),
        ("Status", query.status.clone()),
    ];
    Element::new("query").with_children(
        fields.into_iter().filter_map(|(name, value)| value.map(|v| contract_leaf(name, &v))),
    )
}

/// `<employeeIdentifier i:type="b:...">` argument of the lookups.
fn identifier_element(identifier: &EmployeeIdentifier) -> Element {
    let element = Element::new("employeeIdentifier")
        .with_attribute(XSI_TYPE_ATTRIBUTE, format!("{PREFIX_CONTRACTS}:{}", identifier.type_name()));
    match identifier {
        EmployeeIdentifier::EmployeeNumber { number, company_code } => element
            .with_child(contract_leaf("CompanyCode", company_code.as_deref().unwrap_or_default()))
            .with_child(contract_leaf("EmployeeNumber", number)),
        EmployeeIdentifier::EmailAddress(address) => {
            element.with_child(contract_leaf("EmailAddress", address))
        }
    }
}

/// `<entities>` argument of the updates. An element already named
/// `entities` is sent as is.
fn entities_element(entity: Element) -> Element {
    if entity.name == "entities" {
        entity
    } else {
        Element::new("entities").with_child(entity)
    }
}

/// Children of the first `Results` element in the response.
fn results(operation: &str, body: &Element) -> Result<Vec<Element>> {
    let results = body.find("Results").ok_or_else(|| {
        let detail = body
            .find("OperationResult")
            .and_then(|r| r.find("Message").or_else(|| r.find("Messages")))
            .and_then(Element::text)
            .unwrap_or("no Results element");
        UltiProError::InvalidResponse(format!("{operation}: {detail}"))
    })?;
    Ok(results.children.clone())
}

impl UltiProClient {
    async fn directory_call(
        &self,
        service: DirectoryService,
        operation: &'static str,
        argument: Element,
        idempotency: Idempotency,
    ) -> Result<Vec<Element>> {
        let headers = self.signed_headers(operation)?;
        let body = Element::qualified(operation, service.namespace).with_child(argument);
        let call = SoapCall::new(service.endpoint, service.namespace, service.contract, operation, body)
            .with_headers(headers);

        let response = self.call(&call, idempotency).await?;
        let items = results(operation, &response.body)?;
        debug!(operation, results = items.len(), "Directory call completed");
        Ok(items)
    }

    /// `FindPeople` with the given filter.
    #[instrument(skip(self, query))]
    pub async fn find_people(&self, query: &PersonQuery) -> Result<Vec<Element>> {
        self.directory_call(EMPLOYEE_PERSON, "FindPeople", query_element(query), Idempotency::Idempotent)
            .await
    }

    /// `GetPersonByEmployeeIdentifier` for any identifier kind.
    #[instrument(skip(self, identifier), fields(identifier_type = identifier.type_name()))]
    pub async fn get_person(&self, identifier: &EmployeeIdentifier) -> Result<Vec<Element>> {
        self.directory_call(
            EMPLOYEE_PERSON,
            "GetPersonByEmployeeIdentifier",
            identifier_element(identifier),
            Idempotency::Idempotent,
        )
        .await
    }

    pub async fn get_person_by_employee_number(&self, employee_number: &str) -> Result<Vec<Element>> {
        self.get_person(&EmployeeIdentifier::employee_number(employee_number)).await
    }

    pub async fn get_person_by_email_address(&self, email_address: &str) -> Result<Vec<Element>> {
        self.get_person(&EmployeeIdentifier::email_address(email_address)).await
    }

    /// `UpdatePerson`. Sent once unless non-idempotent retries are enabled.
    #[instrument(skip(self, person))]
    pub async fn update_person(&self, person: Element) -> Result<Vec<Element>> {
        self.directory_call(
            EMPLOYEE_PERSON,
            "UpdatePerson",
            entities_element(person),
            Idempotency::NonIdempotent,
        )
        .await
    }

    /// `GetGlobalEmployeeByEmployeeIdentifier`.
    #[instrument(skip(self, identifier), fields(identifier_type = identifier.type_name()))]
    pub async fn get_global_employee(&self, identifier: &EmployeeIdentifier) -> Result<Vec<Element>> {
        self.directory_call(
            EMPLOYEE_GLOBAL,
            "GetGlobalEmployeeByEmployeeIdentifier",
            identifier_element(identifier),
            Idempotency::Idempotent,
        )
        .await
    }

    pub async fn get_global_employee_by_employee_number(
        &self,
        employee_number: &str,
    ) -> Result<Vec<Element>> {
        self.get_global_employee(&EmployeeIdentifier::employee_number(employee_number)).await
    }

    /// `UpdateGlobalEmployee`. Sent once unless non-idempotent retries are
    /// enabled.
    #[instrument(skip(self, employee))]
    pub async fn update_global_employee(&self, employee: Element) -> Result<Vec<Element>> {
        self.directory_call(
            EMPLOYEE_GLOBAL,
            "UpdateGlobalEmployee",
            entities_element(employee),
            Idempotency::NonIdempotent,
        )
        .await
    }
}
