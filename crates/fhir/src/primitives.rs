//! FHIR primitive types.
//!
//! String-shaped primitives are plain `String` aliases; the descriptor only
//! needs to know how each primitive is written (JSON boolean, number or string,
//! raw XHTML).

use rust_decimal::Decimal;

use crate::element::FhirValue;
use crate::error::DecodeError;
use crate::meta::{PrimitiveKind, ValueKind};
use crate::node::{PrimitiveValue, Value};

pub type Base64Binary = String;
pub type Canonical = String;
pub type Code = String;
pub type Date = String;
pub type DateTime = String;
pub type Id = String;
pub type Instant = String;
pub type Markdown = String;
pub type Uri = String;
pub type Url = String;

/// Narrative XHTML fragment (`<div xmlns="http://www.w3.org/1999/xhtml">...</div>`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Xhtml(pub String);

impl Xhtml {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn mismatch(expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::UnexpectedShape {
        expected,
        found: found.shape(),
    }
}

impl FhirValue for bool {
    const KIND: ValueKind = ValueKind::Primitive(PrimitiveKind::Boolean);

    fn to_value(&self) -> Value {
        Value::Primitive(PrimitiveValue::Boolean(*self))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Primitive(PrimitiveValue::Boolean(b)) => Ok(b),
            Value::Primitive(other) => Err(DecodeError::invalid(
                "boolean",
                format!("`{other}` is not a boolean"),
            )),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FhirValue for i32 {
    const KIND: ValueKind = ValueKind::Primitive(PrimitiveKind::Integer);

    fn to_value(&self) -> Value {
        Value::Primitive(PrimitiveValue::Integer(i64::from(*self)))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Primitive(PrimitiveValue::Integer(i)) => i32::try_from(i)
                .map_err(|_| DecodeError::invalid("integer", format!("{i} is out of range"))),
            Value::Primitive(other) => Err(DecodeError::invalid(
                "integer",
                format!("`{other}` is not an integer"),
            )),
            other => Err(mismatch("integer", &other)),
        }
    }
}

/// `unsignedInt` and `positiveInt`.
impl FhirValue for u32 {
    const KIND: ValueKind = ValueKind::Primitive(PrimitiveKind::UnsignedInt);

    fn to_value(&self) -> Value {
        Value::Primitive(PrimitiveValue::Integer(i64::from(*self)))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Primitive(PrimitiveValue::Integer(i)) => u32::try_from(i).map_err(|_| {
                DecodeError::invalid("unsignedInt", format!("{i} is out of range"))
            }),
            Value::Primitive(other) => Err(DecodeError::invalid(
                "unsignedInt",
                format!("`{other}` is not an unsigned integer"),
            )),
            other => Err(mismatch("unsignedInt", &other)),
        }
    }
}

impl FhirValue for Decimal {
    const KIND: ValueKind = ValueKind::Primitive(PrimitiveKind::Decimal);

    fn to_value(&self) -> Value {
        Value::Primitive(PrimitiveValue::Decimal(*self))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Primitive(PrimitiveValue::Decimal(d)) => Ok(d),
            Value::Primitive(PrimitiveValue::Integer(i)) => Ok(Decimal::from(i)),
            Value::Primitive(other) => Err(DecodeError::invalid(
                "decimal",
                format!("`{other}` is not a decimal"),
            )),
            other => Err(mismatch("decimal", &other)),
        }
    }
}

impl FhirValue for String {
    const KIND: ValueKind = ValueKind::Primitive(PrimitiveKind::String);

    fn to_value(&self) -> Value {
        Value::Primitive(PrimitiveValue::String(self.clone()))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Primitive(PrimitiveValue::String(s)) => Ok(s),
            Value::Primitive(other) => Err(DecodeError::invalid(
                "string",
                format!("`{other}` is not a string"),
            )),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FhirValue for Xhtml {
    const KIND: ValueKind = ValueKind::Primitive(PrimitiveKind::Xhtml);

    fn to_value(&self) -> Value {
        Value::Primitive(PrimitiveValue::String(self.0.clone()))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        String::from_value(value).map(Xhtml)
    }
}

impl<T: FhirValue> FhirValue for Box<T> {
    const KIND: ValueKind = T::KIND;

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        T::from_value(value).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_checks() {
        let too_big = Value::Primitive(PrimitiveValue::Integer(i64::from(i32::MAX) + 1));
        assert!(i32::from_value(too_big).is_err());

        let negative = Value::Primitive(PrimitiveValue::Integer(-1));
        assert!(u32::from_value(negative).is_err());
    }

    #[test]
    fn test_string_rejects_boolean() {
        let err = String::from_value(true.to_value()).unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }

    #[test]
    fn test_decimal_accepts_integer() {
        let value = Value::Primitive(PrimitiveValue::Integer(7));
        assert_eq!(Decimal::from_value(value).unwrap(), Decimal::from(7));
    }
}
