//! `serde_json::Value` → node tree, guided by the descriptor tables.

use meridian_fhir::meta::{PrimitiveKind, Resolved, TypeDescriptor, ValueKind};
use meridian_fhir::node::{ElementNode, FieldValue, PrimitiveValue, Value};
use meridian_fhir::{
    DecodeError, ElementExtension, Extension, FhirElement, PrimitiveExtension, PrimitiveSlot, registry,
};
use serde_json::{Map, Value as JsonValue};

use crate::walk::wire_key;

type Result<T> = std::result::Result<T, DecodeError>;

/// Decodes `json` as a value of the given kind.
pub(crate) fn decode_value(json: &JsonValue, kind: ValueKind) -> Result<Value> {
    match kind {
        ValueKind::Primitive(kind) => decode_primitive(kind, json).map(Value::Primitive),
        ValueKind::Composite(descriptor) => decode_element(json, descriptor()).map(Value::Element),
        ValueKind::Extension => decode_element(json, Extension::descriptor()).map(Value::Element),
        ValueKind::Resource => decode_resource(json).map(Value::Element),
        ValueKind::Choice(_) => Err(DecodeError::UnexpectedShape {
            expected: "typed choice key",
            found: json_shape(json),
        }),
    }
}

/// Decodes any registered resource, dispatching on `resourceType`.
pub(crate) fn decode_resource(json: &JsonValue) -> Result<ElementNode> {
    let object = as_object(json)?;
    let resource_type = object
        .get("resourceType")
        .and_then(JsonValue::as_str)
        .ok_or(DecodeError::MissingResourceType)?;
    let descriptor = registry::lookup(resource_type)
        .ok_or_else(|| DecodeError::UnknownResourceType(resource_type.to_string()))?;
    decode_object(object, descriptor)
}

pub(crate) fn decode_element(json: &JsonValue, descriptor: &'static TypeDescriptor) -> Result<ElementNode> {
    decode_object(as_object(json)?, descriptor)
}

fn decode_object(object: &Map<String, JsonValue>, descriptor: &'static TypeDescriptor) -> Result<ElementNode> {
    match object.get("resourceType") {
        Some(JsonValue::String(found)) if found != descriptor.name => {
            return Err(DecodeError::TypeMismatch {
                expected: descriptor.name.to_string(),
                found: found.clone(),
            });
        }
        None if descriptor.is_resource() => return Err(DecodeError::MissingResourceType),
        _ => {}
    }

    let mut node = ElementNode::empty(descriptor);
    for (key, value) in object {
        if key == "resourceType" || value.is_null() {
            continue;
        }

        if let Some(base) = key.strip_prefix('_') {
            match descriptor.resolve(base) {
                Some(resolved) if resolved.kind().is_primitive() => {
                    let extension = if resolved.field.is_list() {
                        decode_list_extension(value, object.get(base))
                    } else {
                        decode_element_extension(value).map(|element| Some(PrimitiveExtension::Single(element)))
                    };
                    if let Some(extension) = extension.map_err(|e| e.at(descriptor.name, key))? {
                        node.extras.primitive_extensions.insert(base.to_string(), extension);
                    }
                }
                _ => {
                    tracing::debug!(type_name = descriptor.name, key = %key, "keeping unknown primitive extension");
                    node.extras.unknown.insert(key.clone(), value.clone());
                }
            }
            continue;
        }

        let Some(resolved) = descriptor.resolve(key) else {
            tracing::debug!(type_name = descriptor.name, key = %key, "keeping unknown field");
            node.extras.unknown.insert(key.clone(), value.clone());
            continue;
        };

        if resolved.variant.is_some()
            && let Some(existing) = &node.values[resolved.index]
        {
            return Err(DecodeError::DuplicateChoice {
                field: resolved.field.name.to_string(),
                first: wire_key(resolved.field, existing).into_owned(),
                second: key.clone(),
            });
        }

        node.values[resolved.index] =
            decode_field(value, &resolved).map_err(|e| e.at(descriptor.name, key))?;
    }

    Ok(node)
}

fn decode_field(json: &JsonValue, resolved: &Resolved) -> Result<Option<FieldValue>> {
    let kind = resolved.kind();
    if resolved.field.is_list() {
        // A bare value where a list is declared is accepted as a one-item list.
        let items: Vec<&JsonValue> = match json {
            JsonValue::Array(items) => items.iter().filter(|item| !item.is_null()).collect(),
            single => vec![single],
        };
        if items.is_empty() {
            return Ok(None);
        }
        items
            .into_iter()
            .map(|item| decode_value(item, kind).map(|value| with_variant(resolved, value)))
            .collect::<Result<Vec<_>>>()
            .map(|values| Some(FieldValue::List(values)))
    } else {
        if json.is_array() {
            return Err(DecodeError::UnexpectedShape {
                expected: "single value",
                found: "array",
            });
        }
        decode_value(json, kind).map(|value| Some(FieldValue::Single(with_variant(resolved, value))))
    }
}

fn with_variant(resolved: &Resolved, value: Value) -> Value {
    match resolved.variant {
        Some(variant) => Value::Choice {
            suffix: variant.suffix,
            value: Box::new(value),
        },
        None => value,
    }
}

fn decode_primitive(kind: PrimitiveKind, json: &JsonValue) -> Result<PrimitiveValue> {
    match (kind, json) {
        (PrimitiveKind::Boolean, JsonValue::Bool(b)) => Ok(PrimitiveValue::Boolean(*b)),
        (PrimitiveKind::Integer | PrimitiveKind::UnsignedInt, JsonValue::Number(n)) => n
            .as_i64()
            .map(PrimitiveValue::Integer)
            .ok_or_else(|| DecodeError::invalid("integer", format!("`{n}` is not an integer"))),
        // The number's text is kept verbatim (arbitrary_precision), so no float rounding.
        (PrimitiveKind::Decimal, JsonValue::Number(n)) => PrimitiveValue::parse(kind, &n.to_string()),
        (PrimitiveKind::String | PrimitiveKind::Xhtml, JsonValue::String(s)) => {
            Ok(PrimitiveValue::String(s.clone()))
        }
        (_, other) => Err(DecodeError::TypeMismatch {
            expected: primitive_name(kind).to_string(),
            found: json_shape(other).to_string(),
        }),
    }
}

/// Decodes `_field` of a repeated primitive against the value array it annotates,
/// so each entry stays at its wire position even where the value is `null`.
fn decode_list_extension(json: &JsonValue, values: Option<&JsonValue>) -> Result<Option<PrimitiveExtension>> {
    let entries = match json {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::Null => Ok(None),
                item => decode_element_extension(item).map(Some),
            })
            .collect::<Result<Vec<_>>>()?,
        single => vec![Some(decode_element_extension(single)?)],
    };

    let has_value = |position: usize| match values {
        Some(JsonValue::Array(items)) => items.get(position).is_some_and(|item| !item.is_null()),
        None | Some(JsonValue::Null) => false,
        Some(_) => position == 0,
    };
    let len = match values {
        Some(JsonValue::Array(items)) => items.len().max(entries.len()),
        _ => entries.len().max(1),
    };

    let mut entries = entries.into_iter();
    let slots = (0..len)
        .filter_map(|position| PrimitiveSlot::new(has_value(position), entries.next().flatten()))
        .collect();
    Ok(PrimitiveExtension::repeated(slots))
}

fn decode_element_extension(json: &JsonValue) -> Result<ElementExtension> {
    let object = as_object(json)?;
    let id = match object.get("id") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(id)) => Some(id.clone()),
        Some(other) => {
            return Err(DecodeError::TypeMismatch {
                expected: "string".to_string(),
                found: json_shape(other).to_string(),
            });
        }
    };
    let extension = match object.get("extension") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(decode_extension)
            .collect::<Result<Vec<_>>>()?,
        Some(single) => vec![decode_extension(single)?],
    };
    Ok(ElementExtension { id, extension })
}

fn decode_extension(json: &JsonValue) -> Result<Extension> {
    decode_element(json, Extension::descriptor()).and_then(Extension::from_node)
}

fn as_object(json: &JsonValue) -> Result<&Map<String, JsonValue>> {
    json.as_object().ok_or(DecodeError::UnexpectedShape {
        expected: "object",
        found: json_shape(json),
    })
}

fn json_shape(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn primitive_name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Boolean => "boolean",
        PrimitiveKind::Integer => "integer",
        PrimitiveKind::UnsignedInt => "unsignedInt",
        PrimitiveKind::Decimal => "decimal",
        PrimitiveKind::String => "string",
        PrimitiveKind::Xhtml => "xhtml",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_fhir::resources::Patient;
    use serde_json::json;

    #[test]
    fn test_primitive_extension_alignment() {
        let json = json!({
            "resourceType": "Patient",
            "name": [{"given": ["Jim", "Bob"], "_given": [null, {"id": "g2"}]}]
        });
        let node = decode_element(&json, Patient::descriptor()).unwrap();
        let (index, _) = Patient::descriptor().field("name").unwrap();
        let Some(FieldValue::List(names)) = &node.values[index] else {
            panic!("name should decode as a list");
        };
        let Value::Element(name) = &names[0] else {
            panic!("HumanName should decode as an element");
        };
        let given = name.extras.primitive_extension("given").unwrap();
        assert!(given.at(0).is_none());
        assert_eq!(given.at(1).and_then(|e| e.id.as_deref()), Some("g2"));
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let err = decode_primitive(PrimitiveKind::Integer, &json!(1.5)).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { .. }));
    }

    #[test]
    fn test_wrong_json_type_for_primitive() {
        let err = decode_primitive(PrimitiveKind::Boolean, &json!("true")).unwrap_err();
        assert_eq!(err.to_string(), "type mismatch: expected boolean, found string");
    }
}
