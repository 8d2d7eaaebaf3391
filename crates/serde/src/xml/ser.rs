//! Node tree → FHIR XML.

use std::collections::HashSet;
use std::io::Write;

use meridian_fhir::meta::{FieldDescriptor, PrimitiveKind, ValueKind};
use meridian_fhir::node::{ElementNode, FieldValue, PrimitiveValue, Value};
use meridian_fhir::{ElementExtension, FhirElement, FhirValue, FhirVersion, PrimitiveExtension};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde_json::Value as JsonValue;

use super::utils::{FHIR_NAMESPACE, VERSION_ATTRIBUTE, XHTML_NAMESPACE};
use crate::error::{Result, SerdeError};
use crate::walk::{extension_only, wire_key};

/// Output options for the XML encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlOptions {
    /// Writes a `fhirVersion` attribute on the root element.
    pub include_version: bool,
    /// Release named by the `fhirVersion` attribute.
    pub fhir_version: FhirVersion,
}

impl XmlOptions {
    /// Options that tag the root element with `version`.
    pub fn versioned(version: FhirVersion) -> Self {
        Self {
            include_version: true,
            fhir_version: version,
        }
    }
}

/// Serialize a FHIR resource to an XML string.
///
/// # Examples
///
/// ```
/// use meridian_fhir::resources::Patient;
/// use meridian_serde::xml::to_xml_string;
///
/// let patient = Patient { id: Some("example".into()), active: Some(true), ..Default::default() };
/// let xml = to_xml_string(&patient)?;
/// assert_eq!(
///     xml,
///     r#"<Patient xmlns="http://hl7.org/fhir" id="example"><active value="true"/></Patient>"#
/// );
/// # Ok::<(), meridian_serde::SerdeError>(())
/// ```
pub fn to_xml_string<T: FhirValue>(value: &T) -> Result<String> {
    to_xml_string_with(value, &XmlOptions::default())
}

/// Serialize a FHIR resource to an XML string with explicit options.
pub fn to_xml_string_with<T: FhirValue>(value: &T, options: &XmlOptions) -> Result<String> {
    let mut buffer = Vec::new();
    to_xml_writer(&mut buffer, value, options)?;
    String::from_utf8(buffer).map_err(|e| SerdeError::Custom(e.to_string()))
}

/// Serialize a FHIR resource to an XML byte vector.
pub fn to_xml_vec<T: FhirValue>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    to_xml_writer(&mut buffer, value, &XmlOptions::default())?;
    Ok(buffer)
}

/// Serialize a FHIR resource into any writer.
pub fn to_xml_writer<W: Write, T: FhirValue>(writer: W, value: &T, options: &XmlOptions) -> Result<()> {
    let value = value.to_value();
    let node = match &value {
        Value::Element(node) if node.is_resource() => node,
        other => {
            return Err(SerdeError::Custom(format!(
                "XML documents need a resource at the root, found {}",
                other.shape()
            )));
        }
    };
    let mut serializer = XmlSerializer {
        writer: Writer::new(writer),
        options: *options,
    };
    serializer.write_resource(node, true)
}

struct XmlSerializer<W: Write> {
    writer: Writer<W>,
    options: XmlOptions,
}

impl<W: Write> XmlSerializer<W> {
    fn write_resource(&mut self, node: &ElementNode, root: bool) -> Result<()> {
        let mut start = BytesStart::new(node.descriptor.name);
        if root {
            start.push_attribute(("xmlns", FHIR_NAMESPACE));
            if self.options.include_version {
                start.push_attribute((VERSION_ATTRIBUTE, self.options.fhir_version.as_str()));
            }
        }
        self.write_element_body(start, node)
    }

    fn write_element(&mut self, name: &str, node: &ElementNode) -> Result<()> {
        self.write_element_body(BytesStart::new(name), node)
    }

    /// Attribute fields go on the start tag; everything else becomes children.
    fn write_element_body(&mut self, mut start: BytesStart<'_>, node: &ElementNode) -> Result<()> {
        let mut has_children = !node.extras.is_empty();
        for (field, slot) in node.fields() {
            match slot {
                Some(FieldValue::Single(Value::Primitive(value))) if field.is_attribute() => {
                    start.push_attribute((field.name, value.to_string().as_str()));
                }
                Some(_) => has_children = true,
                None => {}
            }
        }

        if !has_children {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        let end = start.to_end().into_owned();
        self.writer.write_event(Event::Start(start))?;
        self.write_children(node)?;
        self.writer.write_event(Event::End(end))?;
        Ok(())
    }

    fn write_children(&mut self, node: &ElementNode) -> Result<()> {
        self.write_contained(node)?;

        let mut written: HashSet<&str> = HashSet::new();
        for (index, (field, slot)) in node.fields().enumerate() {
            if field.is_attribute() || field.is_contained() {
                continue;
            }
            let Some(value) = slot else {
                for (key, extension) in extension_only(node, index) {
                    self.write_extension_only(key, extension)?;
                    written.insert(key);
                }
                continue;
            };

            let key = wire_key(field, value);
            let extension = node
                .extras
                .primitive_extensions
                .get_key_value(key.as_ref())
                .map(|(key, extension)| {
                    written.insert(key.as_str());
                    extension
                });

            for (item, element) in PrimitiveExtension::align(extension, value.values()) {
                match item {
                    Some(item) => self.write_value(field, &key, item, element)?,
                    None => self.write_primitive(&key, None, element)?,
                }
            }
        }

        for (key, extension) in &node.extras.primitive_extensions {
            if !written.contains(key.as_str()) {
                self.write_extension_only(key, extension)?;
            }
        }
        for (key, value) in &node.extras.unknown {
            self.write_json(key, value)?;
        }
        Ok(())
    }

    /// All contained resources, in one wrapper ahead of the other children.
    fn write_contained(&mut self, node: &ElementNode) -> Result<()> {
        if !node.is_resource() {
            return Ok(());
        }
        for (field, slot) in node.fields() {
            let Some(value) = slot.filter(|_| field.is_contained()) else {
                continue;
            };
            let start = BytesStart::new(field.name);
            let end = start.to_end().into_owned();
            self.writer.write_event(Event::Start(start))?;
            for item in value.values() {
                if let Value::Element(resource) = item {
                    self.write_resource(resource, false)?;
                }
            }
            self.writer.write_event(Event::End(end))?;
        }
        Ok(())
    }

    fn write_value(
        &mut self,
        field: &FieldDescriptor,
        name: &str,
        value: &Value,
        extension: Option<&ElementExtension>,
    ) -> Result<()> {
        match value {
            Value::Choice { value, .. } => self.write_value(field, name, value, extension),
            Value::Primitive(PrimitiveValue::String(markup))
                if matches!(field.kind, ValueKind::Primitive(PrimitiveKind::Xhtml)) =>
            {
                self.write_div(markup)
            }
            Value::Primitive(primitive) => self.write_primitive(name, Some(primitive), extension),
            Value::Element(resource) if resource.is_resource() => {
                let start = BytesStart::new(name);
                let end = start.to_end().into_owned();
                self.writer.write_event(Event::Start(start))?;
                self.write_resource(resource, false)?;
                self.writer.write_event(Event::End(end))?;
                Ok(())
            }
            Value::Element(child) => self.write_element(name, child),
        }
    }

    /// `<name id=".." value=".."/>`, with `extension` children when present.
    fn write_primitive(
        &mut self,
        name: &str,
        value: Option<&PrimitiveValue>,
        extension: Option<&ElementExtension>,
    ) -> Result<()> {
        let mut start = BytesStart::new(name);
        if let Some(id) = extension.and_then(|e| e.id.as_deref()) {
            start.push_attribute(("id", id));
        }
        if let Some(value) = value {
            start.push_attribute(("value", value.to_string().as_str()));
        }

        let extensions = extension.map(|e| e.extension.as_slice()).unwrap_or_default();
        if extensions.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        let end = start.to_end().into_owned();
        self.writer.write_event(Event::Start(start))?;
        for extension in extensions {
            self.write_element("extension", &extension.to_node())?;
        }
        self.writer.write_event(Event::End(end))?;
        Ok(())
    }

    fn write_extension_only(&mut self, name: &str, extension: &PrimitiveExtension) -> Result<()> {
        let values: &[Value] = &[];
        for (_, element) in PrimitiveExtension::align(Some(extension), values) {
            self.write_primitive(name, None, element)?;
        }
        Ok(())
    }

    /// Copies the narrative markup through unchanged.
    fn write_div(&mut self, markup: &str) -> Result<()> {
        if markup.trim().is_empty() {
            let mut start = BytesStart::new("div");
            start.push_attribute(("xmlns", XHTML_NAMESPACE));
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(false);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(event) => self.writer.write_event(event)?,
                Err(e) => {
                    return Err(SerdeError::Custom(format!(
                        "Failed to parse XHTML div content: {e}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Unrecognized content kept from a decode, written back as plain elements.
    fn write_json(&mut self, name: &str, json: &JsonValue) -> Result<()> {
        match json {
            JsonValue::Null => Ok(()),
            JsonValue::Array(items) => items.iter().try_for_each(|item| self.write_json(name, item)),
            JsonValue::Object(map) if map.is_empty() => {
                self.writer.write_event(Event::Empty(BytesStart::new(name)))?;
                Ok(())
            }
            JsonValue::Object(map) => {
                self.writer.write_event(Event::Start(BytesStart::new(name)))?;
                for (key, value) in map {
                    self.write_json(key, value)?;
                }
                self.writer.write_event(Event::End(BytesEnd::new(name)))?;
                Ok(())
            }
            JsonValue::String(text) => self.write_scalar(name, text),
            other => self.write_scalar(name, &other.to_string()),
        }
    }

    fn write_scalar(&mut self, name: &str, text: &str) -> Result<()> {
        let mut start = BytesStart::new(name);
        start.push_attribute(("value", text));
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_fhir::datatypes::{CodeableConcept, Narrative};
    use meridian_fhir::primitives::Xhtml;
    use meridian_fhir::resources::{Basic, Patient};

    #[test]
    fn test_version_attribute_only_when_requested() {
        let patient = Patient::default();
        let plain = to_xml_string(&patient).unwrap();
        assert_eq!(plain, r#"<Patient xmlns="http://hl7.org/fhir"/>"#);

        let tagged = to_xml_string_with(&patient, &XmlOptions::versioned(FhirVersion::R5)).unwrap();
        assert_eq!(tagged, r#"<Patient xmlns="http://hl7.org/fhir" fhirVersion="5.0"/>"#);
    }

    #[test]
    fn test_div_written_verbatim() {
        let patient = Patient {
            text: Some(Narrative {
                div: Xhtml::new(r#"<div xmlns="http://www.w3.org/1999/xhtml"><p>Hi &amp; bye</p></div>"#),
                ..Default::default()
            }),
            ..Default::default()
        };
        let xml = to_xml_string(&patient).unwrap();
        assert!(xml.contains(
            r#"<text><status value="generated"/><div xmlns="http://www.w3.org/1999/xhtml"><p>Hi &amp; bye</p></div></text>"#
        ));
    }

    #[test]
    fn test_contained_written_first_in_one_wrapper() {
        let basic = Basic {
            id: Some("b1".into()),
            code: CodeableConcept::from_text("note"),
            contained: vec![
                Patient { id: Some("p1".into()), ..Default::default() }.into(),
                Patient { id: Some("p2".into()), ..Default::default() }.into(),
            ],
            ..Default::default()
        };
        let xml = to_xml_string(&basic).unwrap();
        assert_eq!(
            xml,
            r#"<Basic xmlns="http://hl7.org/fhir" id="b1"><contained><Patient id="p1"/><Patient id="p2"/></contained><code><text value="note"/></code></Basic>"#
        );
    }

    #[test]
    fn test_datatype_root_rejected() {
        let err = to_xml_string(&CodeableConcept::from_text("x")).unwrap_err();
        assert!(err.to_string().contains("resource at the root"));
    }
}
