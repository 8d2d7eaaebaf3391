//! Acknowledgment (ACK) generation.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

use crate::error::{Hl7Error, Result};
use crate::model::{Field, Message, Segment};

const DEFAULT_VERSION: &str = "2.5";
const DEFAULT_PROCESSING_ID: &str = "P";

static CONTROL_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// MSA-1 acknowledgment code (original mode).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AckCode {
    /// `AA`
    Accept,
    /// `AE`
    Error,
    /// `AR`
    Reject,
}

impl AckCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckCode::Accept => "AA",
            AckCode::Error => "AE",
            AckCode::Reject => "AR",
        }
    }
}

impl FromStr for AckCode {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AA" => Ok(AckCode::Accept),
            "AE" => Ok(AckCode::Error),
            "AR" => Ok(AckCode::Reject),
            other => Err(Hl7Error::InvalidInput(format!(
                "invalid acknowledgment code '{other}', expected one of AA, AE, AR"
            ))),
        }
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional overrides for [`generate_ack`].
#[derive(Clone, Debug, Default)]
pub struct AckOptions {
    /// MSA-3 free text.
    pub text: Option<String>,
    /// MSH-3 of the acknowledgment; defaults to the original MSH-5.
    pub application: Option<String>,
    /// MSH-4 of the acknowledgment; defaults to the original MSH-6.
    pub facility: Option<String>,
}

/// Builds the `MSH` + `MSA` acknowledgment for `original`.
///
/// Sender and receiver are swapped, MSH-9 becomes `ACK^{type}^{trigger}` and
/// a fresh control id is issued. The original control id goes to MSA-2.
/// The result uses the original's delimiters and version.
pub fn generate_ack(original: &Message, code: AckCode, options: &AckOptions) -> Result<Message> {
    let msh = original
        .msh()
        .ok_or_else(|| Hl7Error::MissingRequiredSegment("MSH".to_string()))?;
    let encoding = *original.encoding();
    let version = original.version().unwrap_or(DEFAULT_VERSION).to_string();

    let sending_app = first_non_empty([options.application.as_deref(), Some(msh.field(5).value())])
        .unwrap_or("ACK_APP");
    let sending_facility = first_non_empty([options.facility.as_deref(), Some(msh.field(6).value())])
        .unwrap_or("ACK_FAC");
    let receiving_app = first_non_empty([Some(msh.field(3).value())]).unwrap_or("ORIG_APP");
    let receiving_facility = first_non_empty([Some(msh.field(4).value())]).unwrap_or("ORIG_FAC");

    let message_type = msh.field(9);
    let original_type = message_type.component(1).map_or("", |c| c.value());
    let original_trigger = message_type.component(2).map_or("", |c| c.value());
    let processing_id = first_non_empty([Some(msh.field(11).value())]).unwrap_or(DEFAULT_PROCESSING_ID);
    let original_control_id = msh.field(10).value();

    let timestamp = timestamp();
    let control_id = next_control_id(&timestamp);

    let ack_msh = Segment::with_fields(
        "MSH",
        [
            Field::from_text(encoding.field),
            Field::from_text(encoding.msh2()),
            Field::from_text(sending_app),
            Field::from_text(sending_facility),
            Field::from_text(receiving_app),
            Field::from_text(receiving_facility),
            Field::from_text(timestamp),
            Field::default(),
            Field::from_components(["ACK", original_type, original_trigger]),
            Field::from_text(control_id.as_str()),
            Field::from_text(processing_id),
            Field::from_text(version.as_str()),
        ],
    )?;

    let mut msa_fields = vec![
        Field::from_text(code.as_str()),
        Field::from_text(original_control_id),
    ];
    if let Some(text) = options.text.as_deref().filter(|t| !t.is_empty()) {
        msa_fields.push(Field::from_text(text));
    }
    let msa = Segment::with_fields("MSA", msa_fields)?;

    tracing::debug!(
        code = code.as_str(),
        control_id = control_id.as_str(),
        acknowledges = original_control_id,
        "generated acknowledgment"
    );

    Ok(Message::new(
        vec![Arc::new(ack_msh), Arc::new(msa)],
        encoding,
        Some(version),
    ))
}

/// The outcome an acknowledgment reports, read from its `MSA` segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AckStatus {
    /// MSA-1
    pub code: AckCode,
    /// MSA-2, the control id being acknowledged.
    pub control_id: Option<String>,
    /// MSA-3
    pub text: Option<String>,
}

impl AckStatus {
    pub fn is_accepted(&self) -> bool {
        self.code == AckCode::Accept
    }
}

/// Reads MSA-1 to MSA-3 of an acknowledgment.
pub fn read_ack(ack: &Message) -> Result<AckStatus> {
    let msa = ack
        .segment("MSA")
        .ok_or_else(|| Hl7Error::MissingRequiredSegment("MSA".to_string()))?;
    let code = msa.field(1).value();
    if code.is_empty() {
        return Err(Hl7Error::MissingRequiredField {
            segment: "MSA".to_string(),
            field: 1,
        });
    }
    Ok(AckStatus {
        code: code.parse()?,
        control_id: non_empty(msa.field(2).value()),
        text: non_empty(msa.field(3).value()),
    })
}

/// Error details carried by an acknowledgment, in reading order: ERR-3 (the
/// HL7 error code) and ERR-7 of every `ERR` segment, then MSA-3 and MSA-6.
///
/// Empty for an `AA`. An `AE`/`AR` without any detail yields one generic
/// entry so callers always have something to report.
pub fn extract_ack_errors(ack: &Message) -> Result<Vec<String>> {
    let status = read_ack(ack)?;
    if status.is_accepted() {
        return Ok(Vec::new());
    }

    let mut errors = Vec::new();
    for err in ack.get_segments("ERR") {
        if let Some(code) = non_empty(err.field(3).value()) {
            errors.push(format!("Error Code: {code}"));
        }
        if let Some(text) = non_empty(err.field(7).value()) {
            errors.push(format!("Error Text: {text}"));
        }
    }
    if let Some(text) = status.text {
        errors.push(format!("MSA Text Message: {text}"));
    }
    if let Some(msa) = ack.segment("MSA") {
        if let Some(condition) = non_empty(msa.field(6).value()) {
            errors.push(format!("Error Condition: {condition}"));
        }
    }

    if errors.is_empty() {
        errors.push(format!(
            "acknowledgment code {} reports an error but carries no error details",
            status.code
        ));
    }
    Ok(errors)
}

fn non_empty(value: &str) -> Option<String> {
    Some(value).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Local time as `YYYYMMDDHHMMSS`.
pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// `ACK` + timestamp + a three digit sequence: 20 characters, the MSH-10 limit.
fn next_control_id(timestamp: &str) -> String {
    let sequence = CONTROL_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("ACK{timestamp}{sequence:03}")
}

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}
