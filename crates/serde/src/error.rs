use meridian_fhir::DecodeError;
use thiserror::Error;

/// Error types for FHIR serialization and deserialization.
#[derive(Debug, Error)]
pub enum SerdeError {
    /// Malformed JSON text or a JSON value that cannot be written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML or a writer failure inside quick-xml
    #[cfg(feature = "xml")]
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error during serialization/deserialization
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Well-formed input that does not fit the model (wrong resourceType, bad primitive, ...)
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Custom error message
    #[error("{0}")]
    Custom(String),
}

impl SerdeError {
    /// The model-level error, if this is one.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            SerdeError::Decode(err) => Some(err.root_cause()),
            _ => None,
        }
    }
}

impl From<String> for SerdeError {
    fn from(msg: String) -> Self {
        SerdeError::Custom(msg)
    }
}

impl From<&str> for SerdeError {
    fn from(msg: &str) -> Self {
        SerdeError::Custom(msg.to_string())
    }
}

/// Result type alias for FHIR serialization operations
pub type Result<T> = std::result::Result<T, SerdeError>;
