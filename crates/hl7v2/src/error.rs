//! Error type for HL7v2 parsing and message operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Hl7Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing required segment: {0}")]
    MissingRequiredSegment(String),

    #[error("missing required field: {segment}-{field}")]
    MissingRequiredField { segment: String, field: usize },

    /// `line` is the 1-based segment line of the input.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A batch whose envelope does not add up; one entry per problem.
    #[error("invalid batch: {}", .0.join("; "))]
    InvalidBatch(Vec<String>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Hl7Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Hl7Error::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Hl7Error>;
