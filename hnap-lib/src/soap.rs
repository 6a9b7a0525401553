//! SOAP envelope codec for HNAP1 requests and responses.
//!
//! Requests are built from an action name and an ordered list of string
//! parameters; the namespace boilerplate is static so the emitted form stays
//! auditable against the byte-exact shape the firmware expects. Responses
//! are decoded into a [`SoapValue`] tree keyed by local element names, with
//! namespace prefixes stripped.

use std::collections::BTreeMap;

use crate::constants::HNAP1_NAMESPACE;
use crate::error::HnapError;

const ENVELOPE_HEAD: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
    "<soap:Envelope xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" ",
    "xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" ",
    "xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\n",
    "<soap:Body>\n",
);

const ENVELOPE_TAIL: &str = "</soap:Body>\n</soap:Envelope>\n";

/// A decoded response element.
///
/// Leaf elements decode to [`SoapValue::Text`], elements with element
/// children to [`SoapValue::Map`]. Repeated sibling tags decode to a
/// [`SoapValue::List`] in document order; entries are never folded.
#[derive(Debug, Clone, PartialEq)]
pub enum SoapValue {
    Text(String),
    Map(BTreeMap<String, SoapValue>),
    List(Vec<SoapValue>),
}

impl SoapValue {
    /// Leaf text content, if this value is a leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SoapValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Look up a child by local tag name.
    pub fn get(&self, name: &str) -> Option<&SoapValue> {
        match self {
            SoapValue::Map(map) => map.get(name),
            _ => None,
        }
    }

    /// Leaf text of a named child.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(SoapValue::as_str)
    }
}

/// A parsed response envelope: the single element found under `Body`.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapResponse {
    /// Local name of the response root, e.g. `LoginResponse`
    pub root: String,
    /// Decoded contents of the response root
    pub fields: SoapValue,
}

/// Build a request envelope for `action` with parameters in caller order.
///
/// Parameter values are expected to already be protocol-safe strings (hex
/// digests, enum tags); they are escaped only as far as XML well-formedness
/// requires.
pub fn build_envelope(action: &str, params: &[(&str, &str)]) -> String {
    let mut xml = String::with_capacity(ENVELOPE_HEAD.len() + ENVELOPE_TAIL.len() + 128);
    xml.push_str(ENVELOPE_HEAD);
    xml.push('<');
    xml.push_str(action);
    xml.push_str(" xmlns=\"");
    xml.push_str(HNAP1_NAMESPACE);
    xml.push_str("\">\n");
    for (name, value) in params {
        xml.push('<');
        xml.push_str(name);
        xml.push('>');
        xml.push_str(&escape_text(value));
        xml.push_str("</");
        xml.push_str(name);
        xml.push_str(">\n");
    }
    xml.push_str("</");
    xml.push_str(action);
    xml.push_str(">\n");
    xml.push_str(ENVELOPE_TAIL);
    xml
}

/// Parse a response envelope.
///
/// Locates `Envelope` → `Body` (any namespace prefix) and requires exactly
/// one element under `Body`; zero or several response roots are rejected
/// rather than guessed at. `action` is only used for error context.
pub fn parse_envelope(action: &str, xml: &str) -> Result<SoapResponse, HnapError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| HnapError::protocol(action, format!("malformed envelope: {e}")))?;

    let envelope = doc.root_element();
    if envelope.tag_name().name() != "Envelope" {
        return Err(HnapError::protocol(action, "malformed envelope: no Envelope root"));
    }

    let body = envelope
        .children()
        .filter(|n| n.is_element())
        .find(|n| n.tag_name().name() == "Body")
        .ok_or_else(|| HnapError::protocol(action, "malformed envelope: no Body element"))?;

    let mut roots = body.children().filter(|n| n.is_element());
    let root = roots
        .next()
        .ok_or_else(|| HnapError::protocol(action, "empty Body: no response root"))?;
    if roots.next().is_some() {
        return Err(HnapError::protocol(action, "ambiguous Body: multiple response roots"));
    }

    Ok(SoapResponse {
        root: root.tag_name().name().to_string(),
        fields: decode_element(root),
    })
}

fn decode_element(node: roxmltree::Node<'_, '_>) -> SoapValue {
    let children: Vec<_> = node.children().filter(|n| n.is_element()).collect();
    if children.is_empty() {
        return SoapValue::Text(node.text().unwrap_or_default().to_string());
    }

    let mut map: BTreeMap<String, SoapValue> = BTreeMap::new();
    for child in children {
        let name = child.tag_name().name().to_string();
        let value = decode_element(child);
        match map.remove(&name) {
            None => {
                map.insert(name, value);
            }
            Some(SoapValue::List(mut items)) => {
                items.push(value);
                map.insert(name, SoapValue::List(items));
            }
            Some(existing) => {
                map.insert(name, SoapValue::List(vec![existing, value]));
            }
        }
    }
    SoapValue::Map(map)
}

fn escape_text(value: &str) -> String {
    if !value.contains(['&', '<', '>']) {
        return value.to_string();
    }
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
