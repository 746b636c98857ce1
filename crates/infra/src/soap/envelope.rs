//! Request envelope writer
//!
//! ```xml
//! <s:Envelope xmlns:s=".." xmlns:a=".." xmlns:i=".." xmlns:b="..">
//!   <s:Header>
//!     <a:Action s:mustUnderstand="1">{action}</a:Action>
//!     <a:MessageID>{message id}</a:MessageID>
//!     <a:ReplyTo><a:Address>{anonymous}</a:Address></a:ReplyTo>
//!     <a:To s:mustUnderstand="1">{endpoint}</a:To>
//!     {call headers}
//!   </s:Header>
//!   <s:Body>{call body}</s:Body>
//! </s:Envelope>
//! ```
//!
//! Payload elements are written unprefixed. An element declares a default
//! namespace (`xmlns=".."`) only when its namespace differs from the one
//! in scope; elements without a namespace inherit it.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use ultipro_core::SoapCall;
use ultipro_domain::constants::{
    NS_ADDRESSING, NS_CONTRACTS, NS_SOAP_ENVELOPE, NS_XML_SCHEMA_INSTANCE, PREFIX_CONTRACTS,
    PREFIX_XML_SCHEMA_INSTANCE,
};
use ultipro_domain::{Element, Result, UltiProError};

const ANONYMOUS_REPLY_TO: &str = "http://www.w3.org/2005/08/addressing/anonymous";

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| UltiProError::Internal(format!("failed to write SOAP envelope: {e}")))
}

fn addressing_leaf<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
    must_understand: bool,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    if must_understand {
        start.push_attribute(("s:mustUnderstand", "1"));
    }
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

/// Write `element` and its subtree. `in_scope` is the default namespace of
/// the enclosing element.
fn write_element<W: Write>(
    writer: &mut Writer<W>,
    element: &Element,
    in_scope: Option<&str>,
) -> Result<()> {
    let namespace = element.namespace.as_deref().or(in_scope);
    let mut start = BytesStart::new(element.name.as_str());
    if namespace != in_scope {
        if let Some(namespace) = namespace {
            start.push_attribute(("xmlns", namespace));
        }
    }
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    if let Some(text) = &element.text {
        emit(writer, Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child, namespace)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

/// Serialize `call` into a SOAP 1.2 envelope addressed to `endpoint`.
///
/// # Errors
/// `UltiProError::Internal` if the XML writer fails.
pub fn write_envelope(call: &SoapCall, endpoint: &str, message_id: &str) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let xsi = format!("xmlns:{PREFIX_XML_SCHEMA_INSTANCE}");
    let contracts = format!("xmlns:{PREFIX_CONTRACTS}");
    let mut envelope = BytesStart::new("s:Envelope");
    envelope.push_attribute(("xmlns:s", NS_SOAP_ENVELOPE));
    envelope.push_attribute(("xmlns:a", NS_ADDRESSING));
    envelope.push_attribute((xsi.as_str(), NS_XML_SCHEMA_INSTANCE));
    envelope.push_attribute((contracts.as_str(), NS_CONTRACTS));
    emit(&mut writer, Event::Start(envelope))?;

    emit(&mut writer, Event::Start(BytesStart::new("s:Header")))?;
    addressing_leaf(&mut writer, "a:Action", &call.action, true)?;
    addressing_leaf(&mut writer, "a:MessageID", message_id, false)?;
    emit(&mut writer, Event::Start(BytesStart::new("a:ReplyTo")))?;
    addressing_leaf(&mut writer, "a:Address", ANONYMOUS_REPLY_TO, false)?;
    emit(&mut writer, Event::End(BytesEnd::new("a:ReplyTo")))?;
    addressing_leaf(&mut writer, "a:To", endpoint, true)?;
    for header in &call.headers {
        write_element(&mut writer, header, None)?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("s:Header")))?;

    emit(&mut writer, Event::Start(BytesStart::new("s:Body")))?;
    write_element(&mut writer, &call.body, None)?;
    emit(&mut writer, Event::End(BytesEnd::new("s:Body")))?;

    emit(&mut writer, Event::End(BytesEnd::new("s:Envelope")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| UltiProError::Internal(format!("SOAP envelope is not UTF-8: {e}")))
}
