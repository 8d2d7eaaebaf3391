//! `resourceType` → descriptor lookup shared by the JSON and XML codecs.

pub use crate::resources::{RESOURCE_TYPES, lookup};

pub fn is_resource_type(name: &str) -> bool {
    lookup(name).is_some()
}
