//! Resource types and the `resourceType` registry.

mod basic;
mod bundle;
mod encounter;
mod library;
mod observation;
mod patient;

pub use basic::Basic;
pub use bundle::{Bundle, BundleEntry, BundleEntryRequest, BundleLink};
pub use encounter::Encounter;
pub use library::{Library, LibrarySubject};
pub use observation::{
    Observation, ObservationComponent, ObservationEffective, ObservationReferenceRange,
    ObservationValue,
};
pub use patient::{Patient, PatientContact, PatientDeceased, PatientMultipleBirth};

use crate::datatypes::Meta;
use crate::element::{FhirElement, FhirResource, FhirValue};
use crate::error::DecodeError;
use crate::meta::{TypeDescriptor, ValueKind};
use crate::node::Value;

/// Generates the polymorphic [`Resource`] enum and the descriptor lookup from
/// one list of resource types, so both always agree.
macro_rules! resource_registry {
    ($($name:ident),+ $(,)?) => {
        /// Any resource modelled by this crate.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Resource {
            $($name(Box<$name>),)+
        }

        impl Resource {
            pub fn resource_type(&self) -> &'static str {
                match self {
                    $(Resource::$name(_) => <$name as FhirResource>::RESOURCE_TYPE,)+
                }
            }

            pub fn id(&self) -> Option<&str> {
                match self {
                    $(Resource::$name(r) => r.id(),)+
                }
            }

            pub fn meta(&self) -> Option<&Meta> {
                match self {
                    $(Resource::$name(r) => r.meta(),)+
                }
            }
        }

        /// Every registered `resourceType`.
        pub const RESOURCE_TYPES: &[&str] = &[$(stringify!($name)),+];

        /// Descriptor table registered for `resource_type`.
        pub fn lookup(resource_type: &str) -> Option<&'static TypeDescriptor> {
            $(
                if resource_type == stringify!($name) {
                    return Some(<$name as FhirElement>::descriptor());
                }
            )+
            None
        }

        impl FhirValue for Resource {
            const KIND: ValueKind = ValueKind::Resource;

            fn to_value(&self) -> Value {
                match self {
                    $(Resource::$name(r) => r.to_value(),)+
                }
            }

            fn from_value(value: Value) -> Result<Self, DecodeError> {
                let node = match value {
                    Value::Element(node) if node.is_resource() => node,
                    other => {
                        return Err(DecodeError::UnexpectedShape {
                            expected: "resource",
                            found: other.shape(),
                        })
                    }
                };
                $(
                    if node.descriptor.name == stringify!($name) {
                        return <$name as FhirElement>::from_node(node)
                            .map(|r| Resource::$name(Box::new(r)));
                    }
                )+
                Err(DecodeError::UnknownResourceType(node.descriptor.name.to_string()))
            }
        }

        $(
            impl From<$name> for Resource {
                fn from(resource: $name) -> Self {
                    Resource::$name(Box::new(resource))
                }
            }
        )+
    };
}

resource_registry!(Basic, Bundle, Encounter, Library, Observation, Patient);
