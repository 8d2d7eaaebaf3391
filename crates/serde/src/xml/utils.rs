//! Utility functions and constants for XML serialization/deserialization.

/// FHIR namespace URI.
///
/// This namespace is added to the root resource element in FHIR XML documents.
pub const FHIR_NAMESPACE: &str = "http://hl7.org/fhir";

/// Namespace of the narrative `<div>`.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Optional root attribute naming the FHIR release the document was written for.
pub const VERSION_ATTRIBUTE: &str = "fhirVersion";

/// Checks if an element name is the special XHTML div element.
///
/// The `div` element requires special handling because it can contain
/// arbitrary XHTML content and uses a different namespace.
pub fn is_div_element(name: &str) -> bool {
    name == "div"
}

/// `xmlns` and `xmlns:prefix` declarations carry no FHIR data.
pub fn is_namespace_attribute(key: &str) -> bool {
    key == "xmlns" || key.starts_with("xmlns:")
}

pub(crate) fn utf8(bytes: &[u8]) -> crate::Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| crate::SerdeError::Custom(format!("invalid UTF-8 in XML: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_div_element() {
        assert!(is_div_element("div"));
        assert!(!is_div_element("Div"));
        assert!(!is_div_element("text"));
        assert!(!is_div_element("DIV"));
    }

    #[test]
    fn test_is_namespace_attribute() {
        assert!(is_namespace_attribute("xmlns"));
        assert!(is_namespace_attribute("xmlns:xhtml"));
        assert!(!is_namespace_attribute("value"));
        assert!(!is_namespace_attribute("fhirVersion"));
    }
}
