use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::attrs::FieldAttrs;

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "FhirChoice can only be derived for enums",
        ));
    };

    let mut variants = Vec::new();
    for variant in &data.variants {
        let Fields::Unnamed(unnamed) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                variant,
                "choice variants must wrap exactly one value",
            ));
        };
        if unnamed.unnamed.len() != 1 {
            return Err(syn::Error::new_spanned(
                variant,
                "choice variants must wrap exactly one value",
            ));
        }
        let attrs = FieldAttrs::parse(&variant.attrs)?;
        let suffix = attrs.rename.unwrap_or_else(|| variant.ident.to_string());
        variants.push((&variant.ident, &unnamed.unnamed[0].ty, suffix));
    }

    let choice_name = ident.to_string();
    let table = variants.iter().map(|(_, ty, suffix)| {
        quote! {
            ::meridian_fhir::meta::ChoiceVariant {
                suffix: #suffix,
                kind: <#ty as ::meridian_fhir::FhirValue>::KIND,
            }
        }
    });
    let to_arms = variants.iter().map(|(variant, _, suffix)| {
        quote! {
            Self::#variant(inner) => ::meridian_fhir::node::Value::Choice {
                suffix: #suffix,
                value: ::std::boxed::Box::new(::meridian_fhir::FhirValue::to_value(inner)),
            }
        }
    });
    let from_arms = variants.iter().map(|(variant, _, suffix)| {
        quote! {
            #suffix => ::core::result::Result::Ok(
                Self::#variant(::meridian_fhir::FhirValue::from_value(*value)?)
            )
        }
    });
    let suffix_arms = variants.iter().map(|(variant, _, suffix)| {
        quote!(Self::#variant(_) => #suffix)
    });

    Ok(quote! {
        const _: () = {
            const VARIANTS: &[::meridian_fhir::meta::ChoiceVariant] = &[#(#table),*];

            impl ::meridian_fhir::FhirValue for #ident {
                const KIND: ::meridian_fhir::meta::ValueKind =
                    ::meridian_fhir::meta::ValueKind::Choice(VARIANTS);

                fn to_value(&self) -> ::meridian_fhir::node::Value {
                    match self {
                        #(#to_arms,)*
                    }
                }

                fn from_value(
                    value: ::meridian_fhir::node::Value,
                ) -> ::core::result::Result<Self, ::meridian_fhir::DecodeError> {
                    match value {
                        ::meridian_fhir::node::Value::Choice { suffix, value } => match suffix {
                            #(#from_arms,)*
                            other => ::core::result::Result::Err(
                                ::meridian_fhir::DecodeError::UnknownChoice {
                                    choice: #choice_name,
                                    suffix: ::std::string::ToString::to_string(other),
                                },
                            ),
                        },
                        other => ::core::result::Result::Err(
                            ::meridian_fhir::DecodeError::UnexpectedShape {
                                expected: "choice",
                                found: other.shape(),
                            },
                        ),
                    }
                }
            }

            impl #ident {
                /// Wire suffix of the populated variant (`"DateTime"` for `effectiveDateTime`).
                pub fn type_suffix(&self) -> &'static str {
                    match self {
                        #(#suffix_arms,)*
                    }
                }
            }
        };
    })
}
