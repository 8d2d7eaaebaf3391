//! JSON serialization for FHIR model types.
//!
//! Encoding converts the value to its node tree and walks the descriptor
//! tables; decoding does the reverse. Keys the model does not know are kept
//! on the decoded value and written back unchanged.

mod de;
mod ser;

use meridian_fhir::FhirValue;
use serde_json::Value as JsonValue;

use crate::error::Result;

/// Serialize a FHIR value to a `serde_json::Value`.
pub fn to_json_value<T: FhirValue>(value: &T) -> Result<JsonValue> {
    ser::encode_value(&value.to_value())
}

/// Serialize a FHIR resource to a JSON string.
///
/// # Examples
///
/// ```
/// use meridian_fhir::resources::Patient;
/// use meridian_serde::json::to_json_string;
///
/// let patient = Patient { id: Some("example".into()), ..Default::default() };
/// let json = to_json_string(&patient)?;
/// assert_eq!(json, r#"{"resourceType":"Patient","id":"example"}"#);
/// # Ok::<(), meridian_serde::SerdeError>(())
/// ```
pub fn to_json_string<T: FhirValue>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(&to_json_value(value)?)?)
}

/// Serialize a FHIR resource to a pretty-printed JSON string.
pub fn to_json_string_pretty<T: FhirValue>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json_value(value)?)?)
}

/// Serialize a FHIR resource to a JSON byte vector.
pub fn to_json_vec<T: FhirValue>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&to_json_value(value)?)?)
}

/// Deserialize a FHIR value from a `serde_json::Value`.
pub fn from_json_value<T: FhirValue>(json: &JsonValue) -> Result<T> {
    let value = de::decode_value(json, T::KIND)?;
    Ok(T::from_value(value)?)
}

/// Deserialize a FHIR resource from a JSON string.
///
/// # Examples
///
/// ```
/// use meridian_fhir::resources::Patient;
/// use meridian_serde::json::from_json_str;
///
/// let json = r#"{"resourceType": "Patient", "id": "example"}"#;
/// let patient: Patient = from_json_str(json)?;
/// assert_eq!(patient.id.as_deref(), Some("example"));
/// # Ok::<(), meridian_serde::SerdeError>(())
/// ```
pub fn from_json_str<T: FhirValue>(s: &str) -> Result<T> {
    let json: JsonValue = serde_json::from_str(s)?;
    from_json_value(&json)
}

/// Deserialize a FHIR resource from a JSON byte slice.
pub fn from_json_slice<T: FhirValue>(v: &[u8]) -> Result<T> {
    let json: JsonValue = serde_json::from_slice(v)?;
    from_json_value(&json)
}
