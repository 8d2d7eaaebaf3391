//! Batch envelopes: `BHS` + messages + `BTS`.

use std::sync::Arc;

use crate::error::{Hl7Error, Result};
use crate::model::{Field, Message, Segment};
use crate::serializer::to_er7;

/// BHS header values for [`create_batch`]. Empty values leave the field
/// empty; BHS-7 is always the creation time.
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// BHS-3
    pub sending_application: String,
    /// BHS-4
    pub sending_facility: String,
    /// BHS-5
    pub receiving_application: String,
    /// BHS-6
    pub receiving_facility: String,
    /// BHS-9
    pub batch_id: String,
    /// BHS-10 and BTS-2
    pub comment: String,
    /// BHS-11
    pub control_id: String,
}

/// Wraps `messages` in a batch.
///
/// The batch takes its delimiters and version from the first message.
/// BTS-1 holds the message count.
pub fn create_batch(messages: &[Message], options: &BatchOptions) -> Result<Message> {
    let Some(first) = messages.first() else {
        return Err(Hl7Error::InvalidInput(
            "a batch must contain at least one message".to_string(),
        ));
    };
    let encoding = *first.encoding();

    let bhs = Segment::with_fields(
        "BHS",
        [
            Field::from_text(encoding.field),
            Field::from_text(encoding.msh2()),
            Field::from_text(options.sending_application.as_str()),
            Field::from_text(options.sending_facility.as_str()),
            Field::from_text(options.receiving_application.as_str()),
            Field::from_text(options.receiving_facility.as_str()),
            Field::from_text(crate::ack::timestamp()),
            Field::default(),
            Field::from_text(options.batch_id.as_str()),
            Field::from_text(options.comment.as_str()),
            Field::from_text(options.control_id.as_str()),
        ],
    )?;
    let bts = Segment::with_fields(
        "BTS",
        [
            Field::from_text(messages.len().to_string()),
            Field::from_text(options.comment.as_str()),
        ],
    )?;

    let mut segments = vec![Arc::new(bhs)];
    for message in messages {
        segments.extend(message.segments().iter().cloned());
    }
    segments.push(Arc::new(bts));

    tracing::debug!(messages = messages.len(), "created batch");
    Ok(Message::new(
        segments,
        encoding,
        first.version().map(str::to_string),
    ))
}

/// Splits a batch (or file) back into its messages.
///
/// Each `MSH` starts a message. Envelope segments are dropped, as is anything
/// before the first `MSH`. A message keeps its own MSH-12 version, falling
/// back to the batch version.
pub fn split_batch(batch: &Message) -> Vec<Message> {
    let mut groups: Vec<Vec<Arc<Segment>>> = Vec::new();
    for segment in batch.segments() {
        match segment.name() {
            "BHS" | "BTS" | "FHS" | "FTS" => {}
            "MSH" => groups.push(vec![Arc::clone(segment)]),
            _ => {
                if let Some(current) = groups.last_mut() {
                    current.push(Arc::clone(segment));
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|segments| {
            let version = Some(segments[0].field(12).value())
                .filter(|v| !v.is_empty())
                .or(batch.version())
                .map(str::to_string);
            Message::new(segments, *batch.encoding(), version)
        })
        .collect()
}

/// Checks the envelope: exactly one `BHS` and one `BTS`, and a BTS-1 count
/// matching the `MSH` segments between them. A BTS-1 that is not a number is
/// not checked.
pub fn validate_batch(batch: &Message) -> Result<()> {
    let mut errors = Vec::new();

    let headers = batch.get_segments("BHS").len();
    match headers {
        0 => errors.push("batch is missing its BHS (batch header) segment".to_string()),
        1 => {}
        n => errors.push(format!("batch has {n} BHS segments")),
    }

    let trailers = batch.get_segments("BTS");
    match trailers.len() {
        0 => errors.push("batch is missing its BTS (batch trailer) segment".to_string()),
        1 => {}
        n => errors.push(format!("batch has {n} BTS segments")),
    }

    if let Some(trailer) = trailers.first() {
        if let Ok(declared) = trailer.field(1).value().trim().parse::<usize>() {
            let actual = batch
                .segments()
                .iter()
                .skip_while(|s| s.name() != "BHS")
                .take_while(|s| s.name() != "BTS")
                .filter(|s| s.name() == "MSH")
                .count();
            if declared != actual {
                errors.push(format!(
                    "BTS message count mismatch: declared {declared}, actual {actual}"
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Hl7Error::InvalidBatch(errors))
    }
}

/// Validates then writes the batch as ER7.
pub fn batch_to_er7(batch: &Message) -> Result<String> {
    validate_batch(batch)?;
    to_er7(batch)
}
