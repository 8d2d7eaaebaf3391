use crate::datatypes::{
    Annotation, CodeableConcept, Identifier, Meta, Narrative, Period, Quantity, Range, Reference,
};
use crate::extension::Extension;
use crate::extras::Extras;
use crate::primitives::{Code, DateTime, Instant, Uri};
use crate::resources::Resource;
use crate::{FhirChoice, FhirElement};

/// Measurements and simple assertions made about a subject.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(resource, domain)]
pub struct Observation {
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
    pub based_on: Vec<Reference>,
    pub part_of: Vec<Reference>,
    pub status: Code,
    pub category: Vec<CodeableConcept>,
    pub code: CodeableConcept,
    pub subject: Option<Reference>,
    pub focus: Vec<Reference>,
    pub encounter: Option<Reference>,
    pub effective: Option<ObservationEffective>,
    pub issued: Option<Instant>,
    pub performer: Vec<Reference>,
    pub value: Option<ObservationValue>,
    pub data_absent_reason: Option<CodeableConcept>,
    pub interpretation: Vec<CodeableConcept>,
    pub note: Vec<Annotation>,
    pub body_site: Option<CodeableConcept>,
    pub method: Option<CodeableConcept>,
    pub reference_range: Vec<ObservationReferenceRange>,
    pub has_member: Vec<Reference>,
    pub derived_from: Vec<Reference>,
    pub component: Vec<ObservationComponent>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum ObservationEffective {
    DateTime(DateTime),
    Period(Period),
    Instant(Instant),
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum ObservationValue {
    Quantity(Quantity),
    CodeableConcept(CodeableConcept),
    String(String),
    Boolean(bool),
    Integer(i32),
    Range(Range),
    DateTime(DateTime),
    Period(Period),
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(name = "Observation.referenceRange")]
pub struct ObservationReferenceRange {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub low: Option<Quantity>,
    pub high: Option<Quantity>,
    pub r#type: Option<CodeableConcept>,
    pub applies_to: Vec<CodeableConcept>,
    pub age: Option<Range>,
    pub text: Option<String>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(name = "Observation.component")]
pub struct ObservationComponent {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub code: CodeableConcept,
    pub value: Option<ObservationValue>,
    pub data_absent_reason: Option<CodeableConcept>,
    pub interpretation: Vec<CodeableConcept>,
    pub reference_range: Vec<ObservationReferenceRange>,
    #[fhir(extras)]
    pub extras: Extras,
}
