use crate::datatypes::{CodeableConcept, ContactDetail, Meta, Narrative, Period, UsageContext};
use crate::error::DecodeError;
use crate::extension::Extension;
use crate::meta::{TypeDescriptor, ValueKind};
use crate::node::{ElementNode, Value};
use crate::resources::Resource;

/// A model value that can live in a field slot.
///
/// Implemented for the primitive Rust types, for every derived struct and
/// choice enum, for [`Resource`] and for `Box<T>`.
pub trait FhirValue: Sized {
    /// Kind recorded in the descriptor of any field holding this type.
    const KIND: ValueKind;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

/// A struct with a generated descriptor table.
pub trait FhirElement: FhirValue {
    fn descriptor() -> &'static TypeDescriptor;

    fn to_node(&self) -> ElementNode;

    fn from_node(node: ElementNode) -> Result<Self, DecodeError>;
}

/// Base `Resource` contract.
pub trait FhirResource: FhirElement {
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> Option<&str>;

    fn meta(&self) -> Option<&Meta>;
}

/// Resources carrying narrative, contained resources and extensions.
pub trait DomainResource: FhirResource {
    fn text(&self) -> Option<&Narrative>;

    fn contained(&self) -> &[Resource];

    fn extension(&self) -> &[Extension];

    fn modifier_extension(&self) -> &[Extension];

    /// Finds a contained resource by its local id (with or without the leading `#`).
    fn find_contained(&self, id: &str) -> Option<&Resource> {
        let id = id.strip_prefix('#').unwrap_or(id);
        self.contained().iter().find(|r| r.id() == Some(id))
    }
}

/// Resources identified by a canonical URL.
pub trait CanonicalResource: DomainResource {
    fn url(&self) -> Option<&str>;

    fn version(&self) -> Option<&str>;

    fn name(&self) -> Option<&str>;

    fn status(&self) -> &str;

    fn publisher(&self) -> Option<&str>;

    fn contact(&self) -> &[ContactDetail];

    fn use_context(&self) -> &[UsageContext];

    /// `url|version` when both are present, otherwise the bare url.
    fn versioned_url(&self) -> Option<String> {
        match (self.url(), self.version()) {
            (Some(url), Some(version)) => Some(format!("{url}|{version}")),
            (Some(url), None) => Some(url.to_string()),
            _ => None,
        }
    }
}

/// Canonical resources with review and authoring metadata.
pub trait MetadataResource: CanonicalResource {
    fn approval_date(&self) -> Option<&str>;

    fn last_review_date(&self) -> Option<&str>;

    fn effective_period(&self) -> Option<&Period>;

    fn topic(&self) -> &[CodeableConcept];

    fn author(&self) -> &[ContactDetail];
}
