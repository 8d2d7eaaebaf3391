//! FHIR XML → node tree.
//!
//! The document is first read into a small element tree (names, attributes,
//! children, and the raw markup of narrative `<div>`s), which is then decoded
//! against the descriptor tables the same way the JSON decoder walks objects.

use std::io::BufRead;

use meridian_fhir::meta::{PrimitiveKind, Resolved, TypeDescriptor, ValueKind};
use meridian_fhir::node::{ElementNode, FieldValue, PrimitiveValue, Value};
use meridian_fhir::{
    DecodeError, ElementExtension, Extension, Extras, FhirElement, FhirValue, FhirVersion,
    PrimitiveExtension, PrimitiveSlot, registry,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value as JsonValue};

use super::utils::{VERSION_ATTRIBUTE, is_div_element, is_namespace_attribute, utf8};
use crate::error::{Result, SerdeError};
use crate::walk::wire_key;

type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Deserialize a FHIR resource from an XML string.
///
/// # Examples
///
/// ```
/// use meridian_fhir::resources::Patient;
/// use meridian_serde::xml::from_xml_str;
///
/// let xml = r#"<Patient xmlns="http://hl7.org/fhir" id="example"><active value="true"/></Patient>"#;
/// let patient: Patient = from_xml_str(xml)?;
/// assert_eq!(patient.id.as_deref(), Some("example"));
/// assert_eq!(patient.active, Some(true));
/// # Ok::<(), meridian_serde::SerdeError>(())
/// ```
pub fn from_xml_str<T: FhirValue>(xml: &str) -> Result<T> {
    let root = parse_document(xml)?;
    let node = match T::KIND {
        ValueKind::Resource => decode_resource(&root)?,
        ValueKind::Composite(descriptor) if descriptor().is_resource() => {
            let descriptor = descriptor();
            if root.name != descriptor.name {
                return Err(DecodeError::TypeMismatch {
                    expected: descriptor.name.to_string(),
                    found: root.name.clone(),
                }
                .into());
            }
            decode_element(&root, descriptor)?
        }
        _ => {
            return Err(SerdeError::Custom(
                "XML documents can only be decoded into resources".to_string(),
            ));
        }
    };
    Ok(T::from_value(Value::Element(node))?)
}

/// Deserialize a FHIR resource from an XML byte slice.
pub fn from_xml_slice<T: FhirValue>(xml: &[u8]) -> Result<T> {
    from_xml_str(&utf8(xml)?)
}

/// Deserialize a FHIR resource from any buffered reader.
pub fn from_xml_reader<R: BufRead, T: FhirValue>(mut reader: R) -> Result<T> {
    let mut xml = String::new();
    reader.read_to_string(&mut xml)?;
    from_xml_str(&xml)
}

/// Reads the optional `fhirVersion` attribute of the root element.
pub fn detect_version(xml: &str) -> Result<Option<FhirVersion>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(start) | Event::Empty(start) => {
                let version = read_attributes(&start)?
                    .into_iter()
                    .find(|(key, _)| key == VERSION_ATTRIBUTE)
                    .map(|(_, value)| value.parse::<FhirVersion>())
                    .transpose()?;
                return Ok(version);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// One element of the parsed document.
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    /// Verbatim markup, kept for narrative `<div>` elements only.
    markup: Option<String>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        Ok(Self {
            name: utf8(start.local_name().as_ref())?,
            attributes: read_attributes(start)?,
            ..Default::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

fn read_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = utf8(attr.key.as_ref())?;
        if is_namespace_attribute(&key) {
            continue;
        }
        let raw = utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(&raw)
            .map_err(quick_xml::Error::from)?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let mut element = XmlElement::from_start(&start)?;
                if is_div_element(&element.name) {
                    element.markup = Some(capture_markup(&mut reader, start)?);
                    attach(&mut stack, &mut root, element);
                } else {
                    stack.push(element);
                }
            }
            Event::Empty(start) => {
                let mut element = XmlElement::from_start(&start)?;
                if is_div_element(&element.name) {
                    element.markup = Some(format!("<{}/>", utf8(&start)?));
                }
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| SerdeError::Custom("unbalanced XML end tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Eof => break,
            // Text outside narrative, comments, declarations and processing instructions
            _ => {}
        }
    }

    root.ok_or_else(|| SerdeError::Custom("XML document has no root element".to_string()))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Re-serializes everything from `start` to its matching end tag unchanged.
fn capture_markup<'a>(reader: &mut Reader<&'a [u8]>, start: BytesStart<'a>) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Start(start))?;
    let mut depth = 1usize;
    while depth > 0 {
        let event = reader.read_event()?;
        match &event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => {
                return Err(SerdeError::Custom("unterminated <div> element".to_string()));
            }
            _ => {}
        }
        writer.write_event(event)?;
    }
    utf8(&writer.into_inner())
}

fn decode_resource(element: &XmlElement) -> DecodeResult<ElementNode> {
    let descriptor = registry::lookup(&element.name)
        .ok_or_else(|| DecodeError::UnknownResourceType(element.name.clone()))?;
    decode_element(element, descriptor)
}

fn decode_element(element: &XmlElement, descriptor: &'static TypeDescriptor) -> DecodeResult<ElementNode> {
    let mut node = ElementNode::empty(descriptor);

    for (key, value) in &element.attributes {
        if key == VERSION_ATTRIBUTE {
            continue;
        }
        match descriptor.field(key) {
            Some((index, field)) if field.is_attribute() => {
                let kind = field.kind.primitive().unwrap_or(PrimitiveKind::String);
                let value = PrimitiveValue::parse(kind, value).map_err(|e| e.at(descriptor.name, key))?;
                node.values[index] = Some(FieldValue::Single(Value::Primitive(value)));
            }
            _ => tracing::debug!(type_name = descriptor.name, attribute = %key, "ignoring unknown XML attribute"),
        }
    }

    for child in &element.children {
        if descriptor.is_resource()
            && let Some((index, field)) = descriptor.field(&child.name)
            && field.is_contained()
        {
            for resource in &child.children {
                let resource = decode_resource(resource).map_err(|e| e.at(descriptor.name, field.name))?;
                push_value(&mut node, index, true, Value::Element(resource));
            }
            continue;
        }

        let Some(resolved) = descriptor.resolve(&child.name) else {
            tracing::debug!(type_name = descriptor.name, element = %child.name, "keeping unknown element");
            keep_unknown(&mut node.extras, &child.name, element_to_json(child));
            continue;
        };

        if let Some(existing) = &node.values[resolved.index] {
            let first = wire_key(resolved.field, existing);
            if resolved.variant.is_some() && first != child.name {
                return Err(DecodeError::DuplicateChoice {
                    field: resolved.field.name.to_string(),
                    first: first.into_owned(),
                    second: child.name.clone(),
                });
            }
            if !resolved.field.is_list() {
                return Err(DecodeError::UnexpectedShape {
                    expected: "single value",
                    found: "repeated element",
                }
                .at(descriptor.name, &child.name));
            }
        }

        let decoded = decode_child(child, &resolved, &mut node.extras)
            .map_err(|e| e.at(descriptor.name, &child.name))?;

        if let Some(value) = decoded {
            let value = match resolved.variant {
                Some(variant) => Value::Choice {
                    suffix: variant.suffix,
                    value: Box::new(value),
                },
                None => value,
            };
            push_value(&mut node, resolved.index, resolved.field.is_list(), value);
        }
    }

    // Repeated entries hold a slot for every occurrence; keep only those that
    // carry extension data up to the last one.
    node.extras.primitive_extensions = std::mem::take(&mut node.extras.primitive_extensions)
        .into_iter()
        .filter_map(|(key, extension)| {
            match extension {
                PrimitiveExtension::Repeated(slots) => PrimitiveExtension::repeated(slots),
                single => Some(single),
            }
            .map(|extension| (key, extension))
        })
        .collect();

    Ok(node)
}

/// Decodes one child element; `None` for a primitive that carries only extensions.
fn decode_child(
    child: &XmlElement,
    resolved: &Resolved,
    extras: &mut Extras,
) -> DecodeResult<Option<Value>> {
    match resolved.kind() {
        ValueKind::Primitive(PrimitiveKind::Xhtml) => Ok(Some(Value::Primitive(PrimitiveValue::String(
            child.markup.clone().unwrap_or_default(),
        )))),
        ValueKind::Primitive(kind) => {
            let extension = ElementExtension {
                id: child.attribute("id").map(str::to_string),
                extension: child
                    .children
                    .iter()
                    .filter(|c| c.name == "extension")
                    .map(decode_extension)
                    .collect::<DecodeResult<Vec<_>>>()?,
            };
            let value = child
                .attribute("value")
                .map(|text| PrimitiveValue::parse(kind, text).map(Value::Primitive))
                .transpose()?;
            store_primitive_extension(extras, &child.name, resolved.field.is_list(), value.is_some(), extension);
            Ok(value)
        }
        ValueKind::Composite(descriptor) => decode_element(child, descriptor()).map(|n| Some(Value::Element(n))),
        ValueKind::Extension => decode_element(child, Extension::descriptor()).map(|n| Some(Value::Element(n))),
        ValueKind::Resource => {
            let resource = child.children.first().ok_or(DecodeError::UnexpectedShape {
                expected: "resource",
                found: "empty element",
            })?;
            decode_resource(resource).map(|n| Some(Value::Element(n)))
        }
        ValueKind::Choice(_) => Err(DecodeError::UnexpectedShape {
            expected: "typed choice element",
            found: "choice group",
        }),
    }
}

fn decode_extension(element: &XmlElement) -> DecodeResult<Extension> {
    decode_element(element, Extension::descriptor()).and_then(Extension::from_node)
}

fn push_value(node: &mut ElementNode, index: usize, is_list: bool, value: Value) {
    let slot = &mut node.values[index];
    match slot {
        Some(FieldValue::List(values)) => values.push(value),
        _ if is_list => *slot = Some(FieldValue::List(vec![value])),
        _ => *slot = Some(FieldValue::Single(value)),
    }
}

/// Records the `id`/`extension` of one primitive occurrence. Every occurrence of a
/// repeated field takes a slot, so positions match the element order.
fn store_primitive_extension(
    extras: &mut Extras,
    key: &str,
    is_list: bool,
    has_value: bool,
    extension: ElementExtension,
) {
    if !is_list {
        if !extension.is_empty() {
            extras
                .primitive_extensions
                .insert(key.to_string(), PrimitiveExtension::Single(extension));
        }
        return;
    }
    let Some(slot) = PrimitiveSlot::new(has_value, Some(extension)) else {
        return;
    };
    let entry = extras
        .primitive_extensions
        .entry(key.to_string())
        .or_insert_with(|| PrimitiveExtension::Repeated(Vec::new()));
    if let PrimitiveExtension::Repeated(slots) = entry {
        slots.push(slot);
    }
}

fn keep_unknown(extras: &mut Extras, key: &str, value: JsonValue) {
    match extras.unknown.get_mut(key) {
        Some(JsonValue::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = JsonValue::Array(vec![first, value]);
        }
        None => {
            extras.unknown.insert(key.to_string(), value);
        }
    }
}

/// Generic JSON rendering of an element the model does not describe.
fn element_to_json(element: &XmlElement) -> JsonValue {
    if let Some(markup) = &element.markup {
        return JsonValue::String(markup.clone());
    }
    if element.children.is_empty()
        && let [(key, value)] = element.attributes.as_slice()
        && key == "value"
    {
        return JsonValue::String(value.clone());
    }

    let mut object = Map::new();
    for (key, value) in &element.attributes {
        object.insert(key.clone(), JsonValue::String(value.clone()));
    }
    let mut nested = Extras::default();
    for child in &element.children {
        keep_unknown(&mut nested, &child.name, element_to_json(child));
    }
    object.extend(nested.unknown);
    JsonValue::Object(object)
}
