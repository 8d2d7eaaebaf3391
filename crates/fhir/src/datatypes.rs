//! General-purpose datatypes shared by resources.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::element::FhirValue;
use crate::error::DecodeError;
use crate::extension::Extension;
use crate::extras::Extras;
use crate::meta::{PrimitiveKind, ValueKind};
use crate::node::{PrimitiveValue, Value};
use crate::primitives::{
    Base64Binary, Canonical, Code, DateTime, Id, Instant, Markdown, Uri, Url, Xhtml,
};
use crate::{FhirChoice, FhirElement};

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Coding {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub system: Option<Uri>,
    pub version: Option<String>,
    pub code: Option<Code>,
    pub display: Option<String>,
    pub user_selected: Option<bool>,
    #[fhir(extras)]
    pub extras: Extras,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct CodeableConcept {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub coding: Vec<Coding>,
    pub text: Option<String>,
    #[fhir(extras)]
    pub extras: Extras,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            ..Default::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Identifier {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub r#use: Option<Code>,
    pub r#type: Option<CodeableConcept>,
    pub system: Option<Uri>,
    pub value: Option<String>,
    pub period: Option<Period>,
    pub assigner: Option<Box<Reference>>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Reference {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub reference: Option<String>,
    pub r#type: Option<Uri>,
    pub identifier: Option<Identifier>,
    pub display: Option<String>,
    #[fhir(extras)]
    pub extras: Extras,
}

impl Reference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Period {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub start: Option<DateTime>,
    pub end: Option<DateTime>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Quantity {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub value: Option<Decimal>,
    pub comparator: Option<Code>,
    pub unit: Option<String>,
    pub system: Option<Uri>,
    pub code: Option<Code>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Range {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub low: Option<Quantity>,
    pub high: Option<Quantity>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct HumanName {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub r#use: Option<Code>,
    pub text: Option<String>,
    pub family: Option<String>,
    pub given: Vec<String>,
    pub prefix: Vec<String>,
    pub suffix: Vec<String>,
    pub period: Option<Period>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Address {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub r#use: Option<Code>,
    pub r#type: Option<Code>,
    pub text: Option<String>,
    pub line: Vec<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub period: Option<Period>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct ContactPoint {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub system: Option<Code>,
    pub value: Option<String>,
    pub r#use: Option<Code>,
    pub rank: Option<u32>,
    pub period: Option<Period>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct ContactDetail {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub name: Option<String>,
    pub telecom: Vec<ContactPoint>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, PartialEq, FhirElement)]
pub struct UsageContext {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub code: Coding,
    pub value: UsageContextValue,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum UsageContextValue {
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Range(Range),
    Reference(Reference),
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Annotation {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub author: Option<AnnotationAuthor>,
    pub time: Option<DateTime>,
    pub text: Markdown,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum AnnotationAuthor {
    Reference(Reference),
    String(String),
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Attachment {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub content_type: Option<Code>,
    pub language: Option<Code>,
    pub data: Option<Base64Binary>,
    pub url: Option<Url>,
    pub size: Option<u32>,
    pub hash: Option<Base64Binary>,
    pub title: Option<String>,
    pub creation: Option<DateTime>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct RelatedArtifact {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub r#type: Code,
    pub label: Option<String>,
    pub display: Option<String>,
    pub citation: Option<Markdown>,
    pub url: Option<Url>,
    pub document: Option<Attachment>,
    pub resource: Option<Canonical>,
    #[fhir(extras)]
    pub extras: Extras,
}

/// Resource metadata.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Meta {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub version_id: Option<Id>,
    pub last_updated: Option<Instant>,
    pub source: Option<Uri>,
    pub profile: Vec<Canonical>,
    pub security: Vec<Coding>,
    pub tag: Vec<Coding>,
    #[fhir(extras)]
    pub extras: Extras,
}

/// Human-readable summary of a resource.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
pub struct Narrative {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub extension: Vec<Extension>,
    pub status: NarrativeStatus,
    pub div: Xhtml,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NarrativeStatus {
    #[default]
    Generated,
    Extensions,
    Additional,
    Empty,
}

impl NarrativeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeStatus::Generated => "generated",
            NarrativeStatus::Extensions => "extensions",
            NarrativeStatus::Additional => "additional",
            NarrativeStatus::Empty => "empty",
        }
    }
}

impl fmt::Display for NarrativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NarrativeStatus {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generated" => Ok(NarrativeStatus::Generated),
            "extensions" => Ok(NarrativeStatus::Extensions),
            "additional" => Ok(NarrativeStatus::Additional),
            "empty" => Ok(NarrativeStatus::Empty),
            other => Err(DecodeError::invalid(
                "Narrative.status",
                format!("unknown status `{other}`"),
            )),
        }
    }
}

impl FhirValue for NarrativeStatus {
    const KIND: ValueKind = ValueKind::Primitive(PrimitiveKind::String);

    fn to_value(&self) -> Value {
        Value::Primitive(PrimitiveValue::String(self.as_str().to_string()))
    }

    fn from_value(value: Value) -> Result<Self, DecodeError> {
        String::from_value(value)?.parse()
    }
}
