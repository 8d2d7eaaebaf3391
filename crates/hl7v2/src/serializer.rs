//! ER7 serializer.

use crate::encoding::EncodingCharacters;
use crate::error::{Hl7Error, Result};
use crate::escape::escape;
use crate::model::{Component, Field, Message, Segment, is_header};

/// Writes `message` as ER7 text using the message's own delimiters. Every
/// segment is terminated by `\r`; trailing empty fields, repetitions,
/// components and subcomponents are dropped.
pub fn to_er7(message: &Message) -> Result<String> {
    if message.segments().is_empty() {
        return Err(Hl7Error::InvalidInput("message has no segments".to_string()));
    }

    let mut out = String::new();
    for segment in message.segments() {
        out.push_str(&segment_to_er7(segment, message.encoding()));
        out.push('\r');
    }
    Ok(out)
}

/// One segment as an ER7 line, without terminator.
pub fn segment_to_er7(segment: &Segment, encoding: &EncodingCharacters) -> String {
    let mut parts = vec![segment.name().to_string()];
    let mut slots = segment.slots();
    let mut keep = 1;

    if is_header(segment.name()) {
        // Field 1 is the separator written by the join below; field 2 always
        // reflects the delimiters actually used.
        slots.nth(1);
        parts.push(encoding.msh2());
        keep = 2;
    }

    parts.extend(slots.map(|repetitions| {
        join_trimmed(
            repetitions.iter().map(|field| field_to_er7(field, encoding)),
            encoding.repetition,
        )
    }));

    while parts.len() > keep && parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts.join(encoding.field.to_string().as_str())
}

fn field_to_er7(field: &Field, encoding: &EncodingCharacters) -> String {
    if field.is_null() {
        return "\"\"".to_string();
    }
    join_trimmed(
        field
            .components()
            .iter()
            .map(|component| component_to_er7(component, encoding)),
        encoding.component,
    )
}

fn component_to_er7(component: &Component, encoding: &EncodingCharacters) -> String {
    join_trimmed(
        component
            .subcomponents()
            .iter()
            .map(|sub| escape(sub.value(), encoding).into_owned()),
        encoding.subcomponent,
    )
}

fn join_trimmed(parts: impl Iterator<Item = String>, separator: char) -> String {
    let mut parts: Vec<String> = parts.collect();
    while parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts.join(separator.to_string().as_str())
}
