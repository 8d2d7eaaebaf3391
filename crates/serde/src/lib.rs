//! # Meridian FHIR Serialization
//!
//! JSON and XML codecs for `meridian-fhir` model types.
//!
//! ## Features
//!
//! - **JSON Support**: FHIR JSON with `resourceType` first, `_field` primitive
//!   extensions, typed `value[x]` keys, and unknown keys preserved on round-trip.
//! - **XML Support** (feature `xml`, on by default): FHIR XML written with
//!   quick-xml, with an opt-in `fhirVersion` root attribute.
//!
//! ## Architecture
//!
//! Neither codec knows any resource. Both convert the value to its node tree
//! (`meridian_fhir::node`) and walk the descriptor tables generated by
//! `#[derive(FhirElement)]`, so the two formats always agree on which fields
//! exist.
//!
//! ## FHIR JSON ↔ XML Mapping
//!
//! | JSON Pattern | XML Pattern |
//! |--------------|-------------|
//! | `{"active": true}` | `<active value="true"/>` |
//! | `{"birthDate": "1974-12-25", "_birthDate": {"id": "123"}}` | `<birthDate id="123" value="1974-12-25"/>` |
//! | `{"given": ["John", "Doe"]}` | `<given value="John"/><given value="Doe"/>` |
//! | `{"deceasedBoolean": false}` | `<deceasedBoolean value="false"/>` |
//! | `{"contained": [{...}, {...}]}` | `<contained><Patient .../><Basic .../></contained>` |
//!
//! ## Examples
//!
//! ```
//! use meridian_fhir::resources::Patient;
//! use meridian_serde::json::{from_json_str, to_json_string};
//! use meridian_serde::xml::{from_xml_str, to_xml_string};
//!
//! let patient: Patient = from_json_str(r#"{"resourceType":"Patient","active":true}"#)?;
//! let xml = to_xml_string(&patient)?;
//! let back: Patient = from_xml_str(&xml)?;
//! assert_eq!(to_json_string(&back)?, r#"{"resourceType":"Patient","active":true}"#);
//! # Ok::<(), meridian_serde::SerdeError>(())
//! ```

pub mod error;
pub mod json;
mod walk;
#[cfg(feature = "xml")]
pub mod xml;

// Re-export common types and functions
pub use error::{Result, SerdeError};

// Re-export JSON functions at top level for convenience
pub use json::{
    from_json_slice, from_json_str, from_json_value, to_json_string, to_json_string_pretty,
    to_json_value, to_json_vec,
};

#[cfg(feature = "xml")]
pub use xml::{XmlOptions, from_xml_str, to_xml_string, to_xml_string_with};
