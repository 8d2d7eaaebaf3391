use crate::datatypes::{
    Address, CodeableConcept, ContactPoint, HumanName, Identifier, Meta, Narrative, Period,
    Reference,
};
use crate::extension::Extension;
use crate::extras::Extras;
use crate::primitives::{Code, Date, DateTime, Uri};
use crate::resources::Resource;
use crate::{FhirChoice, FhirElement};

/// Demographics of a person receiving care.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(resource, domain)]
pub struct Patient {
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
    pub active: Option<bool>,
    pub name: Vec<HumanName>,
    pub telecom: Vec<ContactPoint>,
    pub gender: Option<Code>,
    pub birth_date: Option<Date>,
    pub deceased: Option<PatientDeceased>,
    pub address: Vec<Address>,
    pub marital_status: Option<CodeableConcept>,
    pub multiple_birth: Option<PatientMultipleBirth>,
    pub contact: Vec<PatientContact>,
    pub general_practitioner: Vec<Reference>,
    pub managing_organization: Option<Reference>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum PatientDeceased {
    Boolean(bool),
    DateTime(DateTime),
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum PatientMultipleBirth {
    Boolean(bool),
    Integer(i32),
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(name = "Patient.contact")]
pub struct PatientContact {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub relationship: Vec<CodeableConcept>,
    pub name: Option<HumanName>,
    pub telecom: Vec<ContactPoint>,
    pub address: Option<Address>,
    pub gender: Option<Code>,
    pub organization: Option<Reference>,
    pub period: Option<Period>,
    #[fhir(extras)]
    pub extras: Extras,
}
