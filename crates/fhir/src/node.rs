//! Format-neutral node tree.
//!
//! Model types convert to and from [`ElementNode`]s; the JSON and XML codecs
//! only ever see nodes and their descriptors. A node stores one slot per
//! descriptor field, in declaration order, so encoders can iterate the
//! descriptor and the values side by side.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::DecodeError;
use crate::extras::Extras;
use crate::meta::{FieldDescriptor, PrimitiveKind, TypeDescriptor};

/// A primitive leaf value.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveValue {
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    String(String),
}

impl PrimitiveValue {
    /// Parses the lexical form used by XML `value` attributes.
    pub fn parse(kind: PrimitiveKind, text: &str) -> Result<Self, DecodeError> {
        match kind {
            PrimitiveKind::Boolean => match text {
                "true" => Ok(Self::Boolean(true)),
                "false" => Ok(Self::Boolean(false)),
                other => Err(DecodeError::invalid(
                    "boolean",
                    format!("`{other}` is not true or false"),
                )),
            },
            PrimitiveKind::Integer | PrimitiveKind::UnsignedInt => text
                .trim()
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|e| DecodeError::invalid("integer", format!("`{text}`: {e}"))),
            PrimitiveKind::Decimal => Decimal::from_str(text.trim())
                .or_else(|_| Decimal::from_scientific(text.trim()))
                .map(Self::Decimal)
                .map_err(|e| DecodeError::invalid("decimal", format!("`{text}`: {e}"))),
            PrimitiveKind::String | PrimitiveKind::Xhtml => Ok(Self::String(text.to_string())),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// A value in the node tree.
#[derive(Clone, Debug)]
pub enum Value {
    Primitive(PrimitiveValue),
    /// Datatype, backbone element, extension or resource.
    Element(ElementNode),
    /// The populated variant of a choice group.
    Choice {
        suffix: &'static str,
        value: Box<Value>,
    },
}

impl Value {
    /// Short name of the value's shape, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Primitive(_) => "primitive",
            Value::Element(_) => "element",
            Value::Choice { .. } => "choice",
        }
    }
}

/// Content of one field slot.
#[derive(Clone, Debug)]
pub enum FieldValue {
    Single(Value),
    List(Vec<Value>),
}

impl FieldValue {
    pub fn values(&self) -> &[Value] {
        match self {
            FieldValue::Single(value) => std::slice::from_ref(value),
            FieldValue::List(values) => values,
        }
    }
}

/// One decoded or to-be-encoded element.
#[derive(Clone, Debug)]
pub struct ElementNode {
    pub descriptor: &'static TypeDescriptor,
    /// One slot per `descriptor.fields` entry; `None` for absent fields.
    pub values: Vec<Option<FieldValue>>,
    pub extras: Extras,
}

impl ElementNode {
    /// A node with every slot empty.
    pub fn empty(descriptor: &'static TypeDescriptor) -> Self {
        Self {
            descriptor,
            values: vec![None; descriptor.fields.len()],
            extras: Extras::default(),
        }
    }

    /// Fields paired with their slot, in declaration order.
    pub fn fields(
        &self,
    ) -> impl Iterator<Item = (&'static FieldDescriptor, Option<&FieldValue>)> + '_ {
        let fields: &'static [FieldDescriptor] = self.descriptor.fields;
        fields
            .iter()
            .zip(self.values.iter().map(Option::as_ref).chain(std::iter::repeat(None)))
    }

    pub fn is_resource(&self) -> bool {
        self.descriptor.is_resource()
    }

    /// `true` when nothing would be written for this node.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none) && self.extras.is_empty()
    }
}

/// Unwraps an element value, checking it was built for `descriptor`.
pub fn expect_element(
    value: Value,
    descriptor: &'static TypeDescriptor,
) -> Result<ElementNode, DecodeError> {
    match value {
        Value::Element(node) if node.descriptor.name == descriptor.name => Ok(node),
        Value::Element(node) => Err(DecodeError::TypeMismatch {
            expected: descriptor.name.to_string(),
            found: node.descriptor.name.to_string(),
        }),
        other => Err(DecodeError::UnexpectedShape {
            expected: "element",
            found: other.shape(),
        }),
    }
}

/// Slot conversions used by `#[derive(FhirElement)]`.
pub mod slot {
    use super::{FieldValue, Value};
    use crate::FhirValue;
    use crate::error::DecodeError;
    use crate::meta::TypeDescriptor;

    pub fn required<T: FhirValue>(value: &T) -> Option<FieldValue> {
        Some(FieldValue::Single(value.to_value()))
    }

    pub fn optional<T: FhirValue>(value: &Option<T>) -> Option<FieldValue> {
        value.as_ref().map(|v| FieldValue::Single(v.to_value()))
    }

    pub fn repeated<T: FhirValue>(values: &[T]) -> Option<FieldValue> {
        if values.is_empty() {
            None
        } else {
            Some(FieldValue::List(values.iter().map(FhirValue::to_value).collect()))
        }
    }

    pub fn take_required<T: FhirValue>(
        value: Option<FieldValue>,
        descriptor: &'static TypeDescriptor,
        index: usize,
    ) -> Result<T, DecodeError> {
        let field = field_name(descriptor, index);
        match value {
            Some(value) => single(value)
                .and_then(T::from_value)
                .map_err(|e| e.at(descriptor.name, field)),
            None => Err(DecodeError::MissingRequiredField {
                type_name: descriptor.name,
                field,
            }),
        }
    }

    pub fn take_optional<T: FhirValue>(
        value: Option<FieldValue>,
        descriptor: &'static TypeDescriptor,
        index: usize,
    ) -> Result<Option<T>, DecodeError> {
        value
            .map(|value| single(value).and_then(T::from_value))
            .transpose()
            .map_err(|e| e.at(descriptor.name, field_name(descriptor, index)))
    }

    pub fn take_repeated<T: FhirValue>(
        value: Option<FieldValue>,
        descriptor: &'static TypeDescriptor,
        index: usize,
    ) -> Result<Vec<T>, DecodeError> {
        let values = match value {
            None => return Ok(Vec::new()),
            Some(FieldValue::Single(value)) => vec![value],
            Some(FieldValue::List(values)) => values,
        };
        values
            .into_iter()
            .map(T::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.at(descriptor.name, field_name(descriptor, index)))
    }

    fn single(value: FieldValue) -> Result<Value, DecodeError> {
        match value {
            FieldValue::Single(value) => Ok(value),
            FieldValue::List(mut values) if values.len() == 1 => Ok(values.remove(0)),
            FieldValue::List(_) => Err(DecodeError::UnexpectedShape {
                expected: "single value",
                found: "list",
            }),
        }
    }

    fn field_name(descriptor: &'static TypeDescriptor, index: usize) -> &'static str {
        descriptor.fields.get(index).map_or("<unknown>", |f| f.name)
    }
}
