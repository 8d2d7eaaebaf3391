//! # Meridian FHIR derive macros
//!
//! Code generation for the `meridian-fhir` model. Two derives are provided:
//!
//! - [`FhirElement`] on structs: emits a `'static` field descriptor table plus the
//!   conversions between the struct and the format-neutral node tree that the
//!   JSON and XML codecs walk.
//! - [`FhirChoice`] on enums: turns a `value[x]` style choice group into a closed
//!   set of variants, each variant name being the wire suffix
//!   (`DateTime` → `effectiveDateTime`).
//!
//! ## Attributes
//!
//! Container attributes (`#[fhir(...)]` on the struct):
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `resource` | the struct is a resource; implements `FhirResource` |
//! | `domain` | with `resource`: also implements `DomainResource` |
//! | `extension` | the struct is the `Extension` type |
//! | `name = "..."` | type name used in descriptors (defaults to the struct name) |
//!
//! Field attributes:
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `rename = "..."` | wire name (defaults to the lowerCamelCase field name) |
//! | `xml_attr` | encoded as an XML attribute instead of a child element |
//! | `extras` | the side-channel field (`Extras`) carrying unknown data |
//!
//! Field cardinality is read from the declared type: `Option<T>` is optional,
//! `Vec<T>` is a list and anything else is a required single value.

extern crate proc_macro;

mod attrs;
mod choice;
mod element;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

#[proc_macro_derive(FhirElement, attributes(fhir))]
pub fn derive_fhir_element(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    element::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(FhirChoice, attributes(fhir))]
pub fn derive_fhir_choice(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    choice::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
