//! The recursive `Extension` element.

use rust_decimal::Decimal;

use crate::datatypes::{CodeableConcept, Coding, Identifier, Period, Quantity, Reference};
use crate::extras::Extras;
use crate::primitives::{Code, Date, DateTime, Uri};
use crate::{FhirChoice, FhirElement};

/// An extension: a `url` plus either one value or nested extensions.
///
/// ```
/// use meridian_fhir::{Extension, ExtensionValue};
///
/// let race = Extension::complex(
///     "http://hl7.org/fhir/us/core/StructureDefinition/us-core-race",
///     vec![Extension::new("text", ExtensionValue::String("Mixed".into()))],
/// );
/// assert!(race.is_complex());
/// assert_eq!(race.find("text").and_then(|e| e.value.as_ref()).map(|v| v.type_suffix()), Some("String"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(extension)]
pub struct Extension {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    #[fhir(xml_attr)]
    pub url: Uri,
    pub extension: Vec<Extension>,
    pub value: Option<ExtensionValue>,
    #[fhir(extras)]
    pub extras: Extras,
}

/// Closed set of `Extension.value[x]` types.
#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum ExtensionValue {
    Boolean(bool),
    Integer(i32),
    Decimal(Decimal),
    String(String),
    Uri(Uri),
    Code(Code),
    Date(Date),
    DateTime(DateTime),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Period(Period),
    Reference(Reference),
    Identifier(Identifier),
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    /// An extension with no value that groups nested extensions.
    pub fn complex(url: impl Into<String>, extension: Vec<Extension>) -> Self {
        Self {
            url: url.into(),
            extension,
            ..Default::default()
        }
    }

    pub fn is_complex(&self) -> bool {
        self.value.is_none()
    }

    /// First nested extension with the given url.
    pub fn find(&self, url: &str) -> Option<&Extension> {
        self.extension.iter().find(|e| e.url == url)
    }
}
