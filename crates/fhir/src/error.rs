//! Error type for converting wire data into model types.

use thiserror::Error;

/// Errors raised while turning decoded data into model types.
///
/// Unknown fields are never an error: decoders keep them in the
/// [`Extras`](crate::Extras) side channel instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload's `resourceType` (or XML root element) is not the requested type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("missing resourceType")]
    MissingResourceType,

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("missing required field: {type_name}.{field}")]
    MissingRequiredField {
        type_name: &'static str,
        field: &'static str,
    },

    /// Two keys of the same `value[x]` group were populated.
    #[error("choice {field}[x] is populated more than once: {first} and {second}")]
    DuplicateChoice {
        field: String,
        first: String,
        second: String,
    },

    #[error("unknown variant {suffix} for choice {choice}")]
    UnknownChoice { choice: &'static str, suffix: String },

    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unsupported FHIR version: {0}")]
    InvalidVersion(String),

    /// Wraps an error with the `Type.field` path where it happened.
    #[error("{path}: {source}")]
    AtField {
        path: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefixes the error with `type_name.field`.
    pub fn at(self, type_name: &str, field: &str) -> Self {
        Self::AtField {
            path: format!("{type_name}.{field}"),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any [`DecodeError::AtField`] wrappers.
    pub fn root_cause(&self) -> &DecodeError {
        match self {
            Self::AtField { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
