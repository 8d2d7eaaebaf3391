use crate::FhirElement;
use crate::datatypes::{CodeableConcept, Coding, Identifier, Meta, Narrative, Period, Reference};
use crate::extension::Extension;
use crate::extras::Extras;
use crate::primitives::{Code, Uri};
use crate::resources::Resource;

/// An interaction between a patient and healthcare providers.
///
/// `class` is a Rust keyword; the raw identifier keeps the wire name intact.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(resource, domain)]
pub struct Encounter {
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
    pub status: Code,
    pub r#class: Coding,
    pub r#type: Vec<CodeableConcept>,
    pub priority: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub period: Option<Period>,
    pub reason_code: Vec<CodeableConcept>,
    pub service_provider: Option<Reference>,
    pub part_of: Option<Reference>,
    #[fhir(extras)]
    pub extras: Extras,
}
