//! # Meridian FHIR model
//!
//! Strongly typed FHIR datatypes and resources whose field metadata is
//! generated at compile time by `#[derive(FhirElement)]`.
//!
//! The crate is organised around three layers:
//!
//! - [`meta`]: the field descriptor tables (name, cardinality, kind, XML form)
//! - [`node`]: a format-neutral tree that every model type converts to and from
//! - the model itself: [`datatypes`], [`Extension`] and [`resources`]
//!
//! Codecs (`meridian-serde`) walk nodes and descriptors only, so a new resource
//! needs no codec code: derive `FhirElement` and add it to the registry.
//!
//! ```
//! use meridian_fhir::{FhirElement, resources::Patient};
//!
//! let descriptor = Patient::descriptor();
//! assert_eq!(descriptor.name, "Patient");
//! assert!(descriptor.field("birthDate").is_some());
//! ```

extern crate self as meridian_fhir;

pub mod datatypes;
mod element;
pub mod error;
pub mod extension;
pub mod extras;
pub mod meta;
pub mod node;
pub mod primitives;
pub mod registry;
pub mod resources;
pub mod version;

pub use element::{
    CanonicalResource, DomainResource, FhirElement, FhirResource, FhirValue, MetadataResource,
};
pub use error::{DecodeError, Result};
pub use extension::{Extension, ExtensionValue};
pub use extras::{ElementExtension, Extras, PrimitiveExtension, PrimitiveSlot};
pub use meridian_fhir_macro::{FhirChoice, FhirElement};
pub use resources::Resource;
pub use version::FhirVersion;
