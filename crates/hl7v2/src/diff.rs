//! Positional comparison of two messages.

use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::model::{Message, Segment};

const MISSING: &str = "<missing>";

/// A segment present on one side only, or with different names at the same
/// position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SegmentDifference {
    pub segment: String,
    /// 0-based segment position.
    pub position: usize,
    pub message1: String,
    pub message2: String,
}

/// A field whose flattened value differs between same-named segments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDifference {
    pub segment: String,
    /// 0-based segment position.
    pub position: usize,
    /// 1-based field index.
    pub field: usize,
    pub message1: String,
    pub message2: String,
}

/// Result of [`compare`]. Serializes to a JSON report with an `identical`
/// flag; `Display` renders a plain-text report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageDiff {
    pub structural: Vec<String>,
    pub segments: Vec<SegmentDifference>,
    pub fields: Vec<FieldDifference>,
}

impl MessageDiff {
    pub fn identical(&self) -> bool {
        self.structural.is_empty() && self.segments.is_empty() && self.fields.is_empty()
    }
}

/// Compares `message1` with `message2` position by position. Never fails.
///
/// Segments are paired by index; segments are not realigned after an
/// insertion, so one extra segment early on shows up as differences in every
/// later position.
pub fn compare(message1: &Message, message2: &Message) -> MessageDiff {
    let mut diff = MessageDiff::default();

    if message1.version() != message2.version() {
        diff.structural.push(format!(
            "Version mismatch: {} vs {}",
            message1.version().unwrap_or("<none>"),
            message2.version().unwrap_or("<none>")
        ));
    }
    if message1.encoding().field != message2.encoding().field {
        diff.structural.push(format!(
            "Field separator mismatch: '{}' vs '{}'",
            message1.encoding().field,
            message2.encoding().field
        ));
    }

    let (left, right) = (message1.segments(), message2.segments());
    if left.len() != right.len() {
        diff.structural.push(format!(
            "Segment count mismatch: {} vs {}",
            left.len(),
            right.len()
        ));
    }

    for position in 0..left.len().max(right.len()) {
        match (left.get(position), right.get(position)) {
            (Some(seg1), Some(seg2)) if seg1.name() == seg2.name() => {
                compare_fields(seg1, seg2, position, &mut diff.fields);
            }
            (Some(seg1), Some(seg2)) => diff.segments.push(SegmentDifference {
                segment: seg1.name().to_string(),
                position,
                message1: seg1.name().to_string(),
                message2: seg2.name().to_string(),
            }),
            (Some(seg1), None) => diff.segments.push(SegmentDifference {
                segment: seg1.name().to_string(),
                position,
                message1: seg1.name().to_string(),
                message2: MISSING.to_string(),
            }),
            (None, Some(seg2)) => diff.segments.push(SegmentDifference {
                segment: seg2.name().to_string(),
                position,
                message1: MISSING.to_string(),
                message2: seg2.name().to_string(),
            }),
            (None, None) => {}
        }
    }

    tracing::debug!(
        structural = diff.structural.len(),
        segments = diff.segments.len(),
        fields = diff.fields.len(),
        "compared messages"
    );
    diff
}

fn compare_fields(
    seg1: &Segment,
    seg2: &Segment,
    position: usize,
    out: &mut Vec<FieldDifference>,
) {
    let (count1, count2) = (seg1.field_count(), seg2.field_count());
    for field in 1..=count1.max(count2) {
        let value1 = (field <= count1).then(|| seg1.field(field).value());
        let value2 = (field <= count2).then(|| seg2.field(field).value());
        if value1 != value2 {
            out.push(FieldDifference {
                segment: seg1.name().to_string(),
                position,
                field,
                message1: value1.unwrap_or(MISSING).to_string(),
                message2: value2.unwrap_or(MISSING).to_string(),
            });
        }
    }
}

impl Serialize for MessageDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MessageDiff", 4)?;
        state.serialize_field("identical", &self.identical())?;
        state.serialize_field("structural", &self.structural)?;
        state.serialize_field("segments", &self.segments)?;
        state.serialize_field("fields", &self.fields)?;
        state.end()
    }
}

impl fmt::Display for MessageDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HL7 v2 Message Comparison")?;
        writeln!(f, "{}", "=".repeat(60))?;
        if self.identical() {
            return writeln!(f, "Messages are IDENTICAL");
        }
        writeln!(f, "Messages are DIFFERENT")?;
        writeln!(f)?;

        if !self.structural.is_empty() {
            writeln!(f, "Structural Differences:")?;
            for note in &self.structural {
                writeln!(f, "  - {note}")?;
            }
            writeln!(f)?;
        }

        if !self.segments.is_empty() {
            writeln!(f, "Segment Differences:")?;
            for d in &self.segments {
                writeln!(f, "  Position {}: {}", d.position, d.segment)?;
                writeln!(f, "    Message 1: {}", d.message1)?;
                writeln!(f, "    Message 2: {}", d.message2)?;
            }
            writeln!(f)?;
        }

        if !self.fields.is_empty() {
            writeln!(f, "Field Differences:")?;
            for d in &self.fields {
                writeln!(f, "  {}-{} (segment {}):", d.segment, d.field, d.position)?;
                writeln!(f, "    Message 1: {}", d.message1)?;
                writeln!(f, "    Message 2: {}", d.message2)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Summary:")?;
        writeln!(f, "  Structural differences: {}", self.structural.len())?;
        writeln!(f, "  Segment differences: {}", self.segments.len())?;
        writeln!(f, "  Field differences: {}", self.fields.len())
    }
}
