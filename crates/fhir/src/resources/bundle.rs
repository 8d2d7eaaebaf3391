use crate::FhirElement;
use crate::datatypes::{Identifier, Meta};
use crate::extension::Extension;
use crate::extras::Extras;
use crate::primitives::{Code, Instant, Uri};
use crate::resources::Resource;

/// A container for a collection of resources.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(resource)]
pub struct Bundle {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub meta: Option<Meta>,
    pub implicit_rules: Option<Uri>,
    pub language: Option<Code>,
    pub identifier: Option<Identifier>,
    pub r#type: Code,
    pub timestamp: Option<Instant>,
    pub total: Option<u32>,
    pub link: Vec<BundleLink>,
    pub entry: Vec<BundleEntry>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(name = "Bundle.link")]
pub struct BundleLink {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub relation: String,
    pub url: Uri,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(name = "Bundle.entry")]
pub struct BundleEntry {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub link: Vec<BundleLink>,
    pub full_url: Option<Uri>,
    pub resource: Option<Resource>,
    pub request: Option<BundleEntryRequest>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(name = "Bundle.entry.request")]
pub struct BundleEntryRequest {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub method: Code,
    pub url: Uri,
    #[fhir(extras)]
    pub extras: Extras,
}

impl Bundle {
    /// Resources of all entries, in entry order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }
}
