use crate::datatypes::{
    Attachment, CodeableConcept, ContactDetail, Identifier, Meta, Narrative, Period, Reference,
    RelatedArtifact, UsageContext,
};
use crate::element::{CanonicalResource, MetadataResource};
use crate::extension::Extension;
use crate::extras::Extras;
use crate::primitives::{Code, Date, DateTime, Markdown, Uri};
use crate::resources::Resource;
use crate::{FhirChoice, FhirElement};

/// A shareable library of knowledge artifacts. Carries the full
/// canonical and metadata resource field set.
#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(resource, domain)]
pub struct Library {
    #[fhir(xml_attr)]
    pub id: Option<String>,
    pub meta: Option<Meta>,
    pub implicit_rules: Option<Uri>,
    pub language: Option<Code>,
    pub text: Option<Narrative>,
    pub contained: Vec<Resource>,
    pub extension: Vec<Extension>,
    pub modifier_extension: Vec<Extension>,
    pub url: Option<Uri>,
    pub identifier: Vec<Identifier>,
    pub version: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub status: Code,
    pub experimental: Option<bool>,
    pub r#type: CodeableConcept,
    pub subject: Option<LibrarySubject>,
    pub date: Option<DateTime>,
    pub publisher: Option<String>,
    pub contact: Vec<ContactDetail>,
    pub description: Option<Markdown>,
    pub use_context: Vec<UsageContext>,
    pub jurisdiction: Vec<CodeableConcept>,
    pub purpose: Option<Markdown>,
    pub usage: Option<String>,
    pub copyright: Option<Markdown>,
    pub approval_date: Option<Date>,
    pub last_review_date: Option<Date>,
    pub effective_period: Option<Period>,
    pub topic: Vec<CodeableConcept>,
    pub author: Vec<ContactDetail>,
    pub editor: Vec<ContactDetail>,
    pub reviewer: Vec<ContactDetail>,
    pub endorser: Vec<ContactDetail>,
    pub related_artifact: Vec<RelatedArtifact>,
    pub content: Vec<Attachment>,
    #[fhir(extras)]
    pub extras: Extras,
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
pub enum LibrarySubject {
    CodeableConcept(CodeableConcept),
    Reference(Reference),
}

impl CanonicalResource for Library {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    fn contact(&self) -> &[ContactDetail] {
        &self.contact
    }

    fn use_context(&self) -> &[UsageContext] {
        &self.use_context
    }
}

impl MetadataResource for Library {
    fn approval_date(&self) -> Option<&str> {
        self.approval_date.as_deref()
    }

    fn last_review_date(&self) -> Option<&str> {
        self.last_review_date.as_deref()
    }

    fn effective_period(&self) -> Option<&Period> {
        self.effective_period.as_ref()
    }

    fn topic(&self) -> &[CodeableConcept] {
        &self.topic
    }

    fn author(&self) -> &[ContactDetail] {
        &self.author
    }
}
