//! FHIR release identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// FHIR releases the codecs can tag output with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FhirVersion {
    #[default]
    R4,
    R5,
}

impl FhirVersion {
    /// Short version string written to the `fhirVersion` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            FhirVersion::R4 => "4.0",
            FhirVersion::R5 => "5.0",
        }
    }

    /// Accepts release names (`R4`), short (`4.0`) and full (`4.0.1`) version strings.
    pub fn normalize(input: &str) -> Result<Self, DecodeError> {
        let trimmed = input.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "R4" | "4" | "4.0" => return Ok(FhirVersion::R4),
            "R5" | "5" | "5.0" => return Ok(FhirVersion::R5),
            _ => {}
        }
        match trimmed.split('.').next() {
            Some("4") if trimmed.starts_with("4.0.") => Ok(FhirVersion::R4),
            Some("5") if trimmed.starts_with("5.0.") => Ok(FhirVersion::R5),
            _ => Err(DecodeError::InvalidVersion(input.to_string())),
        }
    }
}

impl fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FhirVersion {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}
