use crate::FhirElement;
use crate::datatypes::{CodeableConcept, Identifier, Meta, Narrative, Reference};
use crate::extension::Extension;
use crate::extras::Extras;
use crate::primitives::{Code, Date, Uri};
use crate::resources::Resource;

/// Catch-all resource for concepts without a dedicated type.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(resource, domain)]
pub struct Basic {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub meta: Option<Meta>,
    pub implicit_rules: Option<Uri>,
    pub language: Option<Code>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub identifier: Vec<Identifier>,
    pub code: CodeableConcept,
    pub subject: Option<Reference>,
    pub created: Option<Date>,
    pub author: Option<Reference>,
    #[fhir(extras)]
    pub extras: Extras,
}
