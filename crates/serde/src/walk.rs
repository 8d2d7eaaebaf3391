//! Helpers shared by the JSON and XML walkers.

use std::borrow::Cow;

use meridian_fhir::PrimitiveExtension;
use meridian_fhir::meta::FieldDescriptor;
use meridian_fhir::node::{ElementNode, FieldValue, Value};

/// Wire key of a populated field: the plain name, or name plus suffix for choices.
pub(crate) fn wire_key(field: &FieldDescriptor, value: &FieldValue) -> Cow<'static, str> {
    match value.values().first() {
        Some(Value::Choice { suffix, .. }) => field.wire_name(Some(suffix)),
        _ => field.wire_name(None),
    }
}

/// Primitive extensions stored for the field at `index` while the field itself is
/// absent (a primitive carrying extensions but no value).
pub(crate) fn extension_only<'a>(
    node: &'a ElementNode,
    index: usize,
) -> impl Iterator<Item = (&'a str, &'a PrimitiveExtension)> + 'a {
    node.extras
        .primitive_extensions
        .iter()
        .filter(move |(key, _)| {
            node.descriptor
                .resolve(key)
                .is_some_and(|resolved| resolved.index == index)
        })
        .map(|(key, extension)| (key.as_str(), extension))
}

