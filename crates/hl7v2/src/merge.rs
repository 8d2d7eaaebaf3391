//! Combining several messages into one.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::ack::timestamp;
use crate::error::{Hl7Error, Result};
use crate::model::{Field, Message, Segment};

/// How non-`MSH` segments from later messages are folded in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MergeStrategy {
    /// Keep every segment.
    #[default]
    Append,
    /// Keep the first segment of each name.
    Unique,
    /// Keep the last segment of each name, at the position it was seen.
    Replace,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Append => "append",
            MergeStrategy::Unique => "unique",
            MergeStrategy::Replace => "replace",
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(MergeStrategy::Append),
            "unique" => Ok(MergeStrategy::Unique),
            "replace" => Ok(MergeStrategy::Replace),
            _ => Err(Hl7Error::InvalidInput(format!(
                "invalid merge strategy '{s}', expected one of append, unique, replace"
            ))),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merges `messages` into one message.
///
/// The result starts with the first message's `MSH` (when it has one) and
/// takes its delimiters and version. `MSH` segments of the other messages are
/// dropped. With `preserve_msh` off, MSH-7 is restamped with the current
/// time; every other MSH field is kept.
pub fn merge(messages: &[Message], strategy: MergeStrategy, preserve_msh: bool) -> Result<Message> {
    let first = messages
        .first()
        .ok_or_else(|| Hl7Error::InvalidInput("cannot merge an empty list of messages".to_string()))?;

    let mut merged: Vec<Arc<Segment>> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for segment in body_segments(messages) {
        match strategy {
            MergeStrategy::Append => merged.push(Arc::clone(segment)),
            MergeStrategy::Unique => {
                if seen.insert(segment.name()) {
                    merged.push(Arc::clone(segment));
                }
            }
            MergeStrategy::Replace => {
                merged.retain(|s| s.name() != segment.name());
                merged.push(Arc::clone(segment));
            }
        }
    }

    let msh = match first.segments().iter().find(|s| s.name() == "MSH") {
        Some(msh) if preserve_msh => Some(Arc::clone(msh)),
        Some(msh) => Some(Arc::new(msh.with_field(7, Field::from_text(timestamp()))?)),
        None => None,
    };

    tracing::debug!(
        messages = messages.len(),
        strategy = strategy.as_str(),
        segments = merged.len(),
        "merged messages"
    );
    Ok(assemble(first, msh, merged))
}

/// Appends the segments of every message whose name is in `segment_types`
/// (all non-`MSH` segments when `None`) after the first message's `MSH`.
pub fn merge_by_segment_type(messages: &[Message], segment_types: Option<&[&str]>) -> Result<Message> {
    let first = messages
        .first()
        .ok_or_else(|| Hl7Error::InvalidInput("cannot merge an empty list of messages".to_string()))?;

    let merged: Vec<Arc<Segment>> = body_segments(messages)
        .filter(|s| segment_types.is_none_or(|types| types.contains(&s.name())))
        .cloned()
        .collect();

    tracing::debug!(
        messages = messages.len(),
        segments = merged.len(),
        "merged messages by segment type"
    );
    Ok(assemble(first, first.segments().iter().find(|s| s.name() == "MSH").cloned(), merged))
}

fn body_segments(messages: &[Message]) -> impl Iterator<Item = &Arc<Segment>> {
    messages
        .iter()
        .flat_map(Message::segments)
        .filter(|s| s.name() != "MSH")
}

fn assemble(first: &Message, msh: Option<Arc<Segment>>, body: Vec<Arc<Segment>>) -> Message {
    let segments = msh.into_iter().chain(body).collect();
    Message::new(
        segments,
        *first.encoding(),
        first.version().map(str::to_string),
    )
}
