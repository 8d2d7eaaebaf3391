//! HL7 v2.x message tree: message, segment, field, component, subcomponent.
//!
//! Values are immutable once built. Segments are held behind [`Arc`] so
//! operations such as merge can share them between messages without copying.

use std::str::FromStr;
use std::sync::Arc;

use crate::encoding::EncodingCharacters;
use crate::error::{Hl7Error, Result};

/// Escape-decoded text at the bottom of the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Subcomponent(String);

impl Subcomponent {
    pub fn new(value: impl Into<String>) -> Self {
        Subcomponent(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Component {
    subcomponents: Vec<Subcomponent>,
}

impl Component {
    pub fn new(subcomponents: Vec<Subcomponent>) -> Self {
        Component { subcomponents }
    }

    pub fn from_text(value: impl Into<String>) -> Self {
        Component::new(vec![Subcomponent::new(value)])
    }

    pub fn subcomponents(&self) -> &[Subcomponent] {
        &self.subcomponents
    }

    /// 1-based subcomponent lookup.
    pub fn subcomponent(&self, index: usize) -> Option<&Subcomponent> {
        index.checked_sub(1).and_then(|i| self.subcomponents.get(i))
    }

    /// Text of the first subcomponent.
    pub fn value(&self) -> &str {
        self.subcomponents.first().map_or("", Subcomponent::value)
    }

    pub fn is_empty(&self) -> bool {
        self.subcomponents.iter().all(|s| s.value().is_empty())
    }
}

/// One repetition of a field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Field {
    components: Vec<Component>,
    null: bool,
}

static EMPTY_FIELD: Field = Field {
    components: Vec::new(),
    null: false,
};

impl Field {
    pub fn new(components: Vec<Component>) -> Self {
        Field {
            components,
            null: false,
        }
    }

    pub fn from_text(value: impl Into<String>) -> Self {
        Field::new(vec![Component::from_text(value)])
    }

    /// A field with one single-subcomponent component per value.
    pub fn from_components<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Field::new(values.into_iter().map(Component::from_text).collect())
    }

    /// The HL7 null, written `""` on the wire.
    pub fn null() -> Self {
        Field {
            components: Vec::new(),
            null: true,
        }
    }

    pub fn is_null(&self) -> bool {
        self.null
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// 1-based component lookup.
    pub fn component(&self, index: usize) -> Option<&Component> {
        index.checked_sub(1).and_then(|i| self.components.get(i))
    }

    /// The field flattened to a scalar: first component, first subcomponent.
    pub fn value(&self) -> &str {
        self.components.first().map_or("", Component::value)
    }

    pub fn is_empty(&self) -> bool {
        !self.null && self.components.iter().all(Component::is_empty)
    }
}

/// Segments whose first two fields are the delimiters themselves.
pub(crate) fn is_header(name: &str) -> bool {
    matches!(name, "MSH" | "BHS" | "FHS")
}

/// A named segment. Each field slot holds its repetitions in order.
///
/// Fields are numbered from 1. For `MSH` the numbering follows HL7: `MSH-1`
/// is the field separator and `MSH-2` the encoding characters, both stored
/// as plain text fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    name: String,
    fields: Vec<Vec<Field>>,
}

impl Segment {
    /// Builds a segment; `name` must be three ASCII alphanumeric characters.
    pub fn new(name: impl Into<String>, fields: Vec<Vec<Field>>) -> Result<Self> {
        let name = name.into();
        if name.len() != 3 || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Hl7Error::InvalidInput(format!(
                "segment name must be 3 alphanumeric characters, got '{name}'"
            )));
        }
        Ok(Segment { name, fields })
    }

    /// Builds a segment whose fields each have a single repetition.
    pub fn with_fields(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self> {
        Segment::new(name, fields.into_iter().map(|f| vec![f]).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of field slots, populated or not.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// First repetition of field `index` (1-based). Indexes past the end of
    /// the segment read as an empty field.
    pub fn field(&self, index: usize) -> &Field {
        self.repetitions(index).first().unwrap_or(&EMPTY_FIELD)
    }

    /// All repetitions of field `index` (1-based).
    pub fn repetitions(&self, index: usize) -> &[Field] {
        index
            .checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn slots(&self) -> impl Iterator<Item = &[Field]> {
        self.fields.iter().map(Vec::as_slice)
    }

    pub(crate) fn extend_slots(&mut self, slots: impl IntoIterator<Item = Vec<Field>>) {
        self.fields.extend(slots);
    }

    /// A copy of this segment with field `index` (1-based) replaced, padding
    /// with empty fields when the segment is shorter.
    pub fn with_field(&self, index: usize, field: Field) -> Result<Self> {
        let Some(slot) = index.checked_sub(1) else {
            return Err(Hl7Error::InvalidInput("field indexes start at 1".to_string()));
        };
        let mut fields = self.fields.clone();
        if fields.len() <= slot {
            fields.resize_with(slot + 1, Vec::new);
        }
        fields[slot] = vec![field];
        Ok(Segment {
            name: self.name.clone(),
            fields,
        })
    }
}

/// A parsed or constructed HL7 v2.x message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    segments: Vec<Arc<Segment>>,
    encoding: EncodingCharacters,
    version: Option<String>,
}

impl Message {
    pub fn new(
        segments: Vec<Arc<Segment>>,
        encoding: EncodingCharacters,
        version: Option<String>,
    ) -> Self {
        Message {
            segments,
            encoding,
            version,
        }
    }

    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    pub fn encoding(&self) -> &EncodingCharacters {
        &self.encoding
    }

    /// MSH-12 version id, when the message declares one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// All segments named `name`, in message order.
    pub fn get_segments(&self, name: &str) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|s| s.name() == name)
            .map(Arc::as_ref)
            .collect()
    }

    /// First segment named `name`.
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments
            .iter()
            .map(Arc::as_ref)
            .find(|s| s.name() == name)
    }

    pub fn msh(&self) -> Option<&Segment> {
        self.segment("MSH")
    }

    /// MSH-10.
    pub fn control_id(&self) -> Option<&str> {
        self.msh()
            .map(|msh| msh.field(10).value())
            .filter(|id| !id.is_empty())
    }
}

impl FromStr for Message {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::parser::parse(s)
    }
}
