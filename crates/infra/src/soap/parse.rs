//! Response document parser
//!
//! Builds an [`Element`] tree with local names and resolved namespace URIs.
//! Namespace declarations are dropped from the attribute list; other
//! attributes keep their prefixed names.

use std::fmt::Display;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use ultipro_core::SoapResponse;
use ultipro_domain::{Element, Result, UltiProError};

use crate::errors::InfraError;

fn malformed(err: impl Display) -> UltiProError {
    UltiProError::InvalidResponse(format!("malformed XML: {err}"))
}

fn open_element(namespace: &ResolveResult<'_>, start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.local_name().as_ref()));
    if let ResolveResult::Bound(namespace) = namespace {
        element.namespace = Some(String::from_utf8_lossy(namespace.as_ref()).into_owned());
    }
    for attribute in start.attributes() {
        let attribute = attribute.map_err(InfraError::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attribute.unescape_value().map_err(malformed)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        match &mut current.text {
            Some(existing) => existing.push_str(text),
            None => current.text = Some(text.to_string()),
        }
    }
}

/// Parse an XML document into its root element.
///
/// # Errors
/// `UltiProError::InvalidResponse` for malformed or empty documents.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event().map_err(InfraError::from)? {
            (namespace, Event::Start(start)) => stack.push(open_element(&namespace, &start)?),
            (namespace, Event::Empty(start)) => {
                let element = open_element(&namespace, &start)?;
                attach(&mut stack, &mut root, element);
            }
            (_, Event::Text(text)) => {
                let text = text.unescape().map_err(malformed)?;
                append_text(&mut stack, &text);
            }
            (_, Event::CData(data)) => append_text(&mut stack, &String::from_utf8_lossy(&data)),
            (_, Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| UltiProError::InvalidResponse("unbalanced XML end tag".into()))?;
                attach(&mut stack, &mut root, element);
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(UltiProError::InvalidResponse("truncated XML document".into()));
    }
    root.ok_or_else(|| UltiProError::InvalidResponse("empty XML document".into()))
}

/// `code: reason` of a SOAP 1.2 (`Code/Value`, `Reason/Text`) or SOAP 1.1
/// (`faultcode`, `faultstring`) fault.
fn fault_message(fault: &Element) -> String {
    let code = fault
        .path(&["Code", "Value"])
        .and_then(Element::text)
        .or_else(|| fault.child_text("faultcode"));
    let reason = fault
        .path(&["Reason", "Text"])
        .and_then(Element::text)
        .or_else(|| fault.child_text("faultstring"));

    match (code, reason) {
        (Some(code), Some(reason)) => format!("{code}: {reason}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => "unspecified fault".to_string(),
    }
}

/// Parse a response envelope into its header and first body element.
///
/// # Errors
/// `UltiProError::SoapFault` when the body holds a fault,
/// `UltiProError::InvalidResponse` when the document is not an envelope.
pub fn parse_response(xml: &str) -> Result<SoapResponse> {
    let envelope = parse_document(xml)?;
    if envelope.name != "Envelope" {
        return Err(UltiProError::InvalidResponse(format!(
            "expected a SOAP envelope, found <{}>",
            envelope.name
        )));
    }

    let header = envelope.child("Header").cloned().unwrap_or_else(|| Element::new("Header"));
    let body = envelope
        .child("Body")
        .ok_or_else(|| UltiProError::InvalidResponse("SOAP envelope has no Body".into()))?;
    let payload = body.children.first().cloned().unwrap_or_else(|| Element::new("Body"));

    if payload.name == "Fault" {
        return Err(UltiProError::SoapFault(fault_message(&payload)));
    }
    Ok(SoapResponse::new(header, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETRIEVE_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://www.w3.org/2005/08/addressing">
  <s:Header>
    <a:Action s:mustUnderstand="1">http://www.ultipro.com/dataservices/bistream/2/IBIStreamService/RetrieveReportResponse</a:Action>
    <h:Status xmlns:h="http://www.ultipro.com/dataservices/bistream/2">Completed</h:Status>
  </s:Header>
  <s:Body>
    <StreamReportResponse xmlns="http://www.ultipro.com/dataservices/bistream/2">
      <ReportStream>QSxCDQo=</ReportStream>
    </StreamReportResponse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn splits_header_and_body_with_resolved_namespaces() {
        let response = parse_response(RETRIEVE_RESPONSE).unwrap();

        let status = response.header.child("Status").unwrap();
        assert_eq!(status.text(), Some("Completed"));
        assert_eq!(status.namespace.as_deref(), Some("http://www.ultipro.com/dataservices/bistream/2"));
        assert_eq!(response.body.name, "StreamReportResponse");
        assert_eq!(response.body.child_text("ReportStream"), Some("QSxCDQo="));
    }

    #[test]
    fn keeps_attributes_and_drops_namespace_declarations() {
        let doc = r#"<Root xmlns:i="http://www.w3.org/2001/XMLSchema-instance"><Message i:nil="true"/><Name>A &amp; B</Name><Raw><![CDATA[<x>]]></Raw></Root>"#;

        let root = parse_document(doc).unwrap();

        assert!(root.attributes.is_empty());
        assert_eq!(root.child("Message").unwrap().attribute("i:nil"), Some("true"));
        assert_eq!(root.child_text("Name"), Some("A & B"));
        assert_eq!(root.child_text("Raw"), Some("<x>"));
    }

    #[test]
    fn soap_12_fault_becomes_soap_fault_error() {
        let doc = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><s:Fault>
            <s:Code><s:Value>s:Receiver</s:Value></s:Code>
            <s:Reason><s:Text xml:lang="en-US">The token is invalid.</s:Text></s:Reason>
        </s:Fault></s:Body></s:Envelope>"#;

        let err = parse_response(doc).unwrap_err();

        assert_eq!(err, UltiProError::SoapFault("s:Receiver: The token is invalid.".into()));
        assert!(!err.is_transient());
    }

    #[test]
    fn soap_11_fault_is_understood() {
        let doc = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Client</faultcode><faultstring>Bad request</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;

        assert_eq!(
            parse_response(doc).unwrap_err(),
            UltiProError::SoapFault("soap:Client: Bad request".into())
        );
    }

    #[test]
    fn rejects_non_envelopes_and_garbage() {
        assert!(matches!(
            parse_response("<html><body>Service Unavailable</body></html>"),
            Err(UltiProError::InvalidResponse(_))
        ));
        assert!(matches!(parse_response(""), Err(UltiProError::InvalidResponse(_))));
        assert!(matches!(parse_document("<a><b></a>"), Err(UltiProError::InvalidResponse(_))));
    }

    #[test]
    fn missing_header_yields_empty_header() {
        let doc = r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><TokenResponse/></s:Body></s:Envelope>"#;
        let response = parse_response(doc).unwrap();
        assert_eq!(response.header, Element::new("Header"));
        assert_eq!(response.body.name, "TokenResponse");
    }
}
