//! Node tree → `serde_json::Value`.

use std::collections::HashSet;

use meridian_fhir::node::{ElementNode, FieldValue, PrimitiveValue, Value};
use meridian_fhir::{ElementExtension, FhirElement, PrimitiveExtension};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::Result;
use crate::walk::{extension_only, wire_key};

pub(crate) fn encode_value(value: &Value) -> Result<JsonValue> {
    match value {
        Value::Primitive(primitive) => encode_primitive(primitive),
        Value::Element(node) => encode_node(node),
        Value::Choice { value, .. } => encode_value(value),
    }
}

fn encode_primitive(value: &PrimitiveValue) -> Result<JsonValue> {
    Ok(match value {
        PrimitiveValue::Boolean(b) => JsonValue::Bool(*b),
        PrimitiveValue::Integer(i) => JsonValue::Number(Number::from(*i)),
        // Parsed from text so the number keeps its scale ("1.50" stays "1.50").
        PrimitiveValue::Decimal(d) => JsonValue::Number(serde_json::from_str(&d.to_string())?),
        PrimitiveValue::String(s) => JsonValue::String(s.clone()),
    })
}

fn encode_field(value: &FieldValue) -> Result<JsonValue> {
    match value {
        FieldValue::Single(value) => encode_value(value),
        FieldValue::List(values) => values
            .iter()
            .map(encode_value)
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array),
    }
}

/// Encodes one element. Resources get `resourceType` as their first key.
pub(crate) fn encode_node(node: &ElementNode) -> Result<JsonValue> {
    let mut object = Map::new();
    if node.is_resource() {
        object.insert(
            "resourceType".to_string(),
            JsonValue::String(node.descriptor.name.to_string()),
        );
    }

    let mut written: HashSet<&str> = HashSet::new();
    for (index, (field, slot)) in node.fields().enumerate() {
        match slot {
            Some(value) => {
                let key = wire_key(field, value);
                let extension = node.extras.primitive_extensions.get_key_value(key.as_ref());
                if let Some((key, _)) = extension {
                    written.insert(key.as_str());
                }
                let extension = extension.map(|(_, extension)| extension);
                match value {
                    FieldValue::List(values) if field.kind.is_primitive() => {
                        insert_list(&mut object, &key, values, extension)?;
                    }
                    _ => {
                        object.insert(key.to_string(), encode_field(value)?);
                        if let Some(extension) = extension {
                            object.insert(format!("_{key}"), encode_primitive_extension(extension)?);
                        }
                    }
                }
            }
            None => {
                for (key, extension) in extension_only(node, index) {
                    if field.is_list() {
                        insert_list(&mut object, key, &[], Some(extension))?;
                    } else {
                        object.insert(format!("_{key}"), encode_primitive_extension(extension)?);
                    }
                    written.insert(key);
                }
            }
        }
    }

    for (key, extension) in &node.extras.primitive_extensions {
        if !written.contains(key.as_str()) {
            object.insert(format!("_{key}"), encode_primitive_extension(extension)?);
        }
    }
    for (key, value) in &node.extras.unknown {
        if !object.contains_key(key) {
            object.insert(key.clone(), value.clone());
        }
    }

    Ok(JsonValue::Object(object))
}

/// Writes a repeated primitive as `key` and `_key` arrays of equal length, with
/// `null` where a position has no value or no extension data.
fn insert_list(
    object: &mut Map<String, JsonValue>,
    key: &str,
    values: &[Value],
    extension: Option<&PrimitiveExtension>,
) -> Result<()> {
    let aligned = PrimitiveExtension::align(extension, values);
    if aligned.iter().any(|(value, _)| value.is_some()) {
        let values = aligned
            .iter()
            .map(|(value, _)| value.map_or(Ok(JsonValue::Null), encode_value))
            .collect::<Result<Vec<_>>>()?;
        object.insert(key.to_string(), JsonValue::Array(values));
    }
    if aligned.iter().any(|(_, element)| element.is_some()) {
        let elements = aligned
            .iter()
            .map(|(_, element)| element.map_or(Ok(JsonValue::Null), encode_element_extension))
            .collect::<Result<Vec<_>>>()?;
        object.insert(format!("_{key}"), JsonValue::Array(elements));
    }
    Ok(())
}

fn encode_primitive_extension(extension: &PrimitiveExtension) -> Result<JsonValue> {
    match extension {
        PrimitiveExtension::Single(element) => encode_element_extension(element),
        PrimitiveExtension::Repeated(slots) => slots
            .iter()
            .map(|slot| slot.extension().map_or(Ok(JsonValue::Null), encode_element_extension))
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array),
    }
}

fn encode_element_extension(element: &ElementExtension) -> Result<JsonValue> {
    let mut object = Map::new();
    if let Some(id) = &element.id {
        object.insert("id".to_string(), JsonValue::String(id.clone()));
    }
    if !element.extension.is_empty() {
        let extensions = element
            .extension
            .iter()
            .map(|extension| encode_node(&extension.to_node()))
            .collect::<Result<Vec<_>>>()?;
        object.insert("extension".to_string(), JsonValue::Array(extensions));
    }
    Ok(JsonValue::Object(object))
}
