//! XML serialization and deserialization for FHIR resources.
//!
//! ## FHIR JSON ↔ XML Mapping
//!
//! ### Primitives with Extensions
//!
//! **JSON Pattern**:
//! ```json
//! {
//!   "birthDate": "1974-12-25",
//!   "_birthDate": {
//!     "id": "bd1",
//!     "extension": [...]
//!   }
//! }
//! ```
//!
//! **XML Pattern**:
//! ```xml
//! <birthDate id="bd1" value="1974-12-25">
//!   <extension url="...">...</extension>
//! </birthDate>
//! ```
//!
//! A primitive with extensions but no value is written without the `value`
//! attribute.
//!
//! ### Arrays
//!
//! List fields become repeated sibling elements with no wrapper:
//! `<given value="John"/><given value="Doe"/>`.
//!
//! ### Contained Resources
//!
//! All contained resources are written first, inside one `<contained>` element,
//! each as its own typed resource element. Resource-valued fields such as
//! `Bundle.entry.resource` wrap the resource element in the field element.
//!
//! ## Special Attributes
//!
//! - **`value`**: The primitive value of an element
//! - **`id`**: Resource and element identifier
//! - **`url`**: The extension URL
//!
//! All other data is represented as child elements.
//!
//! ## Namespace Handling
//!
//! - FHIR namespace (`http://hl7.org/fhir`) is added to the root resource element
//! - XHTML namespace (`http://www.w3.org/1999/xhtml`) is used for `<div>` elements
//!   containing narrative text; the markup is copied through unchanged
//!
//! ## Versions
//!
//! Output carries no release marker by default. [`XmlOptions`] can add a
//! `fhirVersion="4.0"` style root attribute, and [`detect_version`] reads it back.

pub mod de;
pub mod ser;
mod utils;

pub use utils::{FHIR_NAMESPACE, XHTML_NAMESPACE};

// Re-export serialization functions
pub use ser::{XmlOptions, to_xml_string, to_xml_string_with, to_xml_vec, to_xml_writer};

// Re-export deserialization functions
pub use de::{detect_version, from_xml_reader, from_xml_slice, from_xml_str};
