//! JSON form of a message.
//!
//! The JSON mirrors the tree one level per HL7 level, so a message survives
//! `to_json_string` / `from_json_str` unchanged, delimiters and HL7 nulls
//! included:
//!
//! ```json
//! {
//!   "segments": [
//!     { "name": "PID", "fields": [
//!       { "repetitions": [ { "components": [ { "subcomponents": ["1"] } ] } ] }
//!     ] }
//!   ],
//!   "encoding_chars": { "field_separator": "|", "component_separator": "^", ... },
//!   "version": "2.5"
//! }
//! ```
//!
//! Text is held unescaped. On input, a field given as a bare `components`
//! list is read as a single repetition, a component without `subcomponents`
//! as one empty subcomponent, and missing `encoding_chars` as the defaults.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::encoding::EncodingCharacters;
use crate::error::{Hl7Error, Result};
use crate::model::{Component, Field, Message, Segment, Subcomponent};

#[derive(Debug, Serialize, Deserialize)]
struct MessageJson {
    segments: Vec<SegmentJson>,
    #[serde(default)]
    encoding_chars: EncodingJson,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SegmentJson {
    name: String,
    #[serde(default)]
    fields: Vec<FieldJson>,
}

/// One field slot with its repetitions.
#[derive(Debug, Serialize, Deserialize)]
struct FieldJson {
    #[serde(default)]
    repetitions: Vec<RepetitionJson>,
    #[serde(default, skip_serializing)]
    components: Option<Vec<ComponentJson>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RepetitionJson {
    #[serde(default)]
    components: Vec<ComponentJson>,
    #[serde(default, skip_serializing_if = "is_false")]
    null: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ComponentJson {
    #[serde(default)]
    subcomponents: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct EncodingJson {
    field_separator: String,
    component_separator: String,
    repetition_separator: String,
    escape_character: String,
    subcomponent_separator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuation_character: Option<String>,
}

impl Default for EncodingJson {
    fn default() -> Self {
        EncodingJson::from(&EncodingCharacters::default())
    }
}

impl From<&EncodingCharacters> for EncodingJson {
    fn from(encoding: &EncodingCharacters) -> Self {
        EncodingJson {
            field_separator: encoding.field.to_string(),
            component_separator: encoding.component.to_string(),
            repetition_separator: encoding.repetition.to_string(),
            escape_character: encoding.escape.to_string(),
            subcomponent_separator: encoding.subcomponent.to_string(),
            continuation_character: encoding.continuation.map(String::from),
        }
    }
}

impl TryFrom<EncodingJson> for EncodingCharacters {
    type Error = Hl7Error;

    fn try_from(json: EncodingJson) -> Result<Self> {
        let continuation = json
            .continuation_character
            .as_deref()
            .map(|c| delimiter("continuation_character", c))
            .transpose()?;
        Ok(EncodingCharacters {
            field: delimiter("field_separator", &json.field_separator)?,
            component: delimiter("component_separator", &json.component_separator)?,
            repetition: delimiter("repetition_separator", &json.repetition_separator)?,
            escape: delimiter("escape_character", &json.escape_character)?,
            subcomponent: delimiter("subcomponent_separator", &json.subcomponent_separator)?,
            continuation,
        })
    }
}

fn delimiter(key: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Hl7Error::InvalidInput(format!(
            "{key} must be a single character, got '{value}'"
        ))),
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<&Message> for MessageJson {
    fn from(message: &Message) -> Self {
        MessageJson {
            segments: message
                .segments()
                .iter()
                .map(|segment| SegmentJson {
                    name: segment.name().to_string(),
                    fields: segment
                        .slots()
                        .map(|repetitions| FieldJson {
                            repetitions: repetitions.iter().map(repetition_json).collect(),
                            components: None,
                        })
                        .collect(),
                })
                .collect(),
            encoding_chars: EncodingJson::from(message.encoding()),
            version: message.version().map(str::to_string),
        }
    }
}

fn repetition_json(field: &Field) -> RepetitionJson {
    RepetitionJson {
        components: field
            .components()
            .iter()
            .map(|component| ComponentJson {
                subcomponents: Some(
                    component
                        .subcomponents()
                        .iter()
                        .map(|sub| sub.value().to_string())
                        .collect(),
                ),
            })
            .collect(),
        null: field.is_null(),
    }
}

impl TryFrom<MessageJson> for Message {
    type Error = Hl7Error;

    fn try_from(json: MessageJson) -> Result<Self> {
        let encoding = EncodingCharacters::try_from(json.encoding_chars)?;
        let segments = json
            .segments
            .into_iter()
            .map(|segment| {
                let fields = segment.fields.into_iter().map(field_slot).collect();
                Segment::new(segment.name, fields).map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Message::new(segments, encoding, json.version))
    }
}

fn field_slot(json: FieldJson) -> Vec<Field> {
    if json.repetitions.is_empty() {
        if let Some(components) = json.components {
            return vec![Field::new(components.into_iter().map(component).collect())];
        }
    }
    json.repetitions
        .into_iter()
        .map(|repetition| {
            if repetition.null {
                Field::null()
            } else {
                Field::new(repetition.components.into_iter().map(component).collect())
            }
        })
        .collect()
}

fn component(json: ComponentJson) -> Component {
    match json.subcomponents {
        Some(subcomponents) => Component::new(subcomponents.into_iter().map(Subcomponent::new).collect()),
        None => Component::from_text(""),
    }
}

pub fn to_json_value(message: &Message) -> Result<Value> {
    Ok(serde_json::to_value(MessageJson::from(message))?)
}

/// Compact JSON text.
pub fn to_json_string(message: &Message) -> Result<String> {
    Ok(serde_json::to_string(&MessageJson::from(message))?)
}

pub fn to_json_string_pretty(message: &Message) -> Result<String> {
    Ok(serde_json::to_string_pretty(&MessageJson::from(message))?)
}

pub fn from_json_value(value: Value) -> Result<Message> {
    let json: MessageJson = serde_json::from_value(value)?;
    let message = Message::try_from(json)?;
    tracing::debug!(segments = message.segments().len(), "decoded HL7v2 message from JSON");
    Ok(message)
}

pub fn from_json_str(text: &str) -> Result<Message> {
    from_json_value(serde_json::from_str(text)?)
}
