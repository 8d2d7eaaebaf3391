//! Per-node side channel.
//!
//! Decoders put two things here that have no structural field: keys the model
//! does not know (kept verbatim so newer payloads round-trip) and the
//! `_field` companions carrying `id`/`extension` for primitive values.
//! Encoders read them back; nothing else touches them.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::extension::Extension;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extras {
    /// Unrecognized keys with their original JSON value.
    pub unknown: Map<String, JsonValue>,
    /// Primitive extensions keyed by wire name (`birthDate`, `valueString`).
    pub primitive_extensions: BTreeMap<String, PrimitiveExtension>,
}

/// `_field` content of a single or repeated primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveExtension {
    Single(ElementExtension),
    /// One slot per list position as written on the wire. Positions past the
    /// last slot are plain values.
    Repeated(Vec<PrimitiveSlot>),
}

/// One position of a repeated primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveSlot {
    /// A value without `id` or `extension`.
    Value,
    /// A value carrying `id`/`extension`.
    Extended(ElementExtension),
    /// `id`/`extension` at a position that has no value.
    Valueless(ElementExtension),
}

/// The `id` and `extension` carried by one primitive value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementExtension {
    pub id: Option<String>,
    pub extension: Vec<Extension>,
}

impl Extras {
    pub fn is_empty(&self) -> bool {
        self.unknown.is_empty() && self.primitive_extensions.is_empty()
    }

    pub fn primitive_extension(&self, key: &str) -> Option<&PrimitiveExtension> {
        self.primitive_extensions.get(key)
    }

    /// Attaches extensions to the single primitive stored under `key`.
    pub fn set_primitive_extensions(&mut self, key: impl Into<String>, extension: Vec<Extension>) {
        self.primitive_extensions.insert(
            key.into(),
            PrimitiveExtension::Single(ElementExtension {
                id: None,
                extension,
            }),
        );
    }
}

impl PrimitiveExtension {
    /// Builds a repeated entry, dropping the plain values at the tail. `None`
    /// when no slot carries extension data.
    pub fn repeated(mut slots: Vec<PrimitiveSlot>) -> Option<Self> {
        while matches!(slots.last(), Some(PrimitiveSlot::Value)) {
            slots.pop();
        }
        (!slots.is_empty()).then_some(PrimitiveExtension::Repeated(slots))
    }

    /// Extension data at wire position `index` (always 0 for single values).
    pub fn at(&self, index: usize) -> Option<&ElementExtension> {
        match self {
            PrimitiveExtension::Single(element) => (index == 0).then_some(element),
            PrimitiveExtension::Repeated(slots) => slots.get(index).and_then(PrimitiveSlot::extension),
        }
    }

    /// Number of wire positions this entry covers.
    pub fn len(&self) -> usize {
        match self {
            PrimitiveExtension::Single(_) => 1,
            PrimitiveExtension::Repeated(slots) => slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pairs `values` with their extension data in wire order. Valueless
    /// positions yield `(None, Some(_))`; values past the last slot yield
    /// `(Some(_), None)`.
    pub fn align<'a, T>(
        extension: Option<&'a PrimitiveExtension>,
        values: &'a [T],
    ) -> Vec<(Option<&'a T>, Option<&'a ElementExtension>)> {
        let slots = match extension {
            None => &[][..],
            Some(PrimitiveExtension::Single(element)) => {
                let mut out = vec![(values.first(), Some(element))];
                out.extend(values.iter().skip(1).map(|value| (Some(value), None)));
                return out;
            }
            Some(PrimitiveExtension::Repeated(slots)) => slots.as_slice(),
        };

        let mut values = values.iter();
        let mut out = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                PrimitiveSlot::Value => {
                    if let Some(value) = values.next() {
                        out.push((Some(value), None));
                    }
                }
                PrimitiveSlot::Extended(element) => out.push((values.next(), Some(element))),
                PrimitiveSlot::Valueless(element) => out.push((None, Some(element))),
            }
        }
        out.extend(values.map(|value| (Some(value), None)));
        out
    }
}

impl PrimitiveSlot {
    pub fn extension(&self) -> Option<&ElementExtension> {
        match self {
            PrimitiveSlot::Value => None,
            PrimitiveSlot::Extended(element) | PrimitiveSlot::Valueless(element) => Some(element),
        }
    }

    /// Slot for a position given whether it holds a value; `None` when the
    /// position has neither a value nor extension data.
    pub fn new(has_value: bool, extension: Option<ElementExtension>) -> Option<Self> {
        match (has_value, extension.filter(|e| !e.is_empty())) {
            (true, None) => Some(PrimitiveSlot::Value),
            (true, Some(element)) => Some(PrimitiveSlot::Extended(element)),
            (false, Some(element)) => Some(PrimitiveSlot::Valueless(element)),
            (false, None) => None,
        }
    }
}

impl ElementExtension {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.extension.is_empty()
    }
}
