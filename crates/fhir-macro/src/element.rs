use heck::ToLowerCamelCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, GenericArgument, Ident, PathArguments, Type};

use crate::attrs::{ContainerAttrs, FieldAttrs};

enum Shape {
    Required,
    Optional,
    List,
}

struct ModelField<'a> {
    ident: &'a Ident,
    shape: Shape,
    inner: &'a Type,
    wire: String,
    xml_attr: bool,
}

/// Splits `Option<T>` / `Vec<T>` into their shape and `T`.
fn classify(ty: &Type) -> (Shape, &Type) {
    if let Type::Path(path) = ty
        && path.qself.is_none()
        && let Some(segment) = path.path.segments.last()
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        if segment.ident == "Option" {
            return (Shape::Optional, inner);
        }
        if segment.ident == "Vec" {
            return (Shape::List, inner);
        }
    }
    (Shape::Required, ty)
}

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let container = ContainerAttrs::parse(&input.attrs)?;
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "FhirElement cannot be derived for generic types",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "FhirElement can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ident,
            "FhirElement requires named fields",
        ));
    };

    let mut fields = Vec::new();
    let mut extras_ident = None;
    for field in &named.named {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.extras {
            extras_ident = Some(field_ident);
            continue;
        }
        let (shape, inner) = classify(&field.ty);
        let wire = attrs
            .rename
            .unwrap_or_else(|| field_ident.unraw().to_string().to_lower_camel_case());
        fields.push(ModelField {
            ident: field_ident,
            shape,
            inner,
            wire,
            xml_attr: attrs.xml_attr,
        });
    }

    let type_name = container.name.clone().unwrap_or_else(|| ident.to_string());
    let type_kind = if container.resource {
        quote!(Resource)
    } else if container.extension {
        quote!(Extension)
    } else {
        quote!(Element)
    };
    let value_kind = if container.extension {
        quote!(::meridian_fhir::meta::ValueKind::Extension)
    } else {
        quote!(::meridian_fhir::meta::ValueKind::Composite(
            <#ident as ::meridian_fhir::FhirElement>::descriptor
        ))
    };

    let descriptors = fields.iter().map(|f| {
        let name = &f.wire;
        let inner = f.inner;
        let cardinality = match f.shape {
            Shape::List => quote!(List),
            Shape::Required | Shape::Optional => quote!(Single),
        };
        let required = matches!(f.shape, Shape::Required);
        let xml = if f.xml_attr {
            quote!(Attribute)
        } else {
            quote!(Element)
        };
        quote! {
            ::meridian_fhir::meta::FieldDescriptor {
                name: #name,
                cardinality: ::meridian_fhir::meta::Cardinality::#cardinality,
                required: #required,
                kind: <#inner as ::meridian_fhir::FhirValue>::KIND,
                xml: ::meridian_fhir::meta::XmlForm::#xml,
            }
        }
    });

    let to_slots = fields.iter().map(|f| {
        let field = f.ident;
        match f.shape {
            Shape::Required => quote!(::meridian_fhir::node::slot::required(&self.#field)),
            Shape::Optional => quote!(::meridian_fhir::node::slot::optional(&self.#field)),
            Shape::List => quote!(::meridian_fhir::node::slot::repeated(&self.#field)),
        }
    });

    let from_slots = fields.iter().enumerate().map(|(index, f)| {
        let field = f.ident;
        let take = match f.shape {
            Shape::Required => quote!(take_required),
            Shape::Optional => quote!(take_optional),
            Shape::List => quote!(take_repeated),
        };
        quote!(#field: ::meridian_fhir::node::slot::#take(next(), descriptor, #index)?)
    });

    let (extras_out, extras_pattern, extras_init) = match extras_ident {
        Some(extras) => (
            quote!(::core::clone::Clone::clone(&self.#extras)),
            quote!(extras),
            quote!(#extras: extras,),
        ),
        None => (
            quote!(::core::default::Default::default()),
            quote!(extras: _),
            quote!(),
        ),
    };

    let resource_impls = if container.resource {
        resource_impls(ident, &type_name, &fields, container.domain)?
    } else {
        quote!()
    };

    Ok(quote! {
        impl ::meridian_fhir::FhirElement for #ident {
            fn descriptor() -> &'static ::meridian_fhir::meta::TypeDescriptor {
                static DESCRIPTOR: ::meridian_fhir::meta::TypeDescriptor =
                    ::meridian_fhir::meta::TypeDescriptor {
                        name: #type_name,
                        kind: ::meridian_fhir::meta::TypeKind::#type_kind,
                        fields: &[#(#descriptors),*],
                    };
                &DESCRIPTOR
            }

            fn to_node(&self) -> ::meridian_fhir::node::ElementNode {
                ::meridian_fhir::node::ElementNode {
                    descriptor: <Self as ::meridian_fhir::FhirElement>::descriptor(),
                    values: ::std::vec![#(#to_slots),*],
                    extras: #extras_out,
                }
            }

            fn from_node(
                node: ::meridian_fhir::node::ElementNode,
            ) -> ::core::result::Result<Self, ::meridian_fhir::DecodeError> {
                let descriptor = <Self as ::meridian_fhir::FhirElement>::descriptor();
                let ::meridian_fhir::node::ElementNode { values, #extras_pattern, .. } = node;
                let mut values = values.into_iter();
                let mut next = move || values.next().flatten();
                ::core::result::Result::Ok(Self {
                    #(#from_slots,)*
                    #extras_init
                })
            }
        }

        impl ::meridian_fhir::FhirValue for #ident {
            const KIND: ::meridian_fhir::meta::ValueKind = #value_kind;

            fn to_value(&self) -> ::meridian_fhir::node::Value {
                ::meridian_fhir::node::Value::Element(::meridian_fhir::FhirElement::to_node(self))
            }

            fn from_value(
                value: ::meridian_fhir::node::Value,
            ) -> ::core::result::Result<Self, ::meridian_fhir::DecodeError> {
                ::meridian_fhir::node::expect_element(
                    value,
                    <Self as ::meridian_fhir::FhirElement>::descriptor(),
                )
                .and_then(<Self as ::meridian_fhir::FhirElement>::from_node)
            }
        }

        #resource_impls
    })
}

fn resource_impls(
    ident: &Ident,
    type_name: &str,
    fields: &[ModelField<'_>],
    domain: bool,
) -> syn::Result<TokenStream> {
    let require = |name: &str| {
        if fields.iter().any(|f| f.ident.unraw() == name) {
            Ok(())
        } else {
            Err(syn::Error::new_spanned(
                ident,
                format!("resource types must declare a `{name}` field"),
            ))
        }
    };
    require("id")?;
    require("meta")?;

    let mut tokens = quote! {
        impl ::meridian_fhir::FhirResource for #ident {
            const RESOURCE_TYPE: &'static str = #type_name;

            fn id(&self) -> ::core::option::Option<&str> {
                self.id.as_deref()
            }

            fn meta(&self) -> ::core::option::Option<&::meridian_fhir::datatypes::Meta> {
                self.meta.as_ref()
            }
        }
    };

    if domain {
        for name in ["text", "contained", "extension", "modifier_extension"] {
            require(name)?;
        }
        tokens.extend(quote! {
            impl ::meridian_fhir::DomainResource for #ident {
                fn text(&self) -> ::core::option::Option<&::meridian_fhir::datatypes::Narrative> {
                    self.text.as_ref()
                }

                fn contained(&self) -> &[::meridian_fhir::Resource] {
                    &self.contained
                }

                fn extension(&self) -> &[::meridian_fhir::Extension] {
                    &self.extension
                }

                fn modifier_extension(&self) -> &[::meridian_fhir::Extension] {
                    &self.modifier_extension
                }
            }
        });
    }

    Ok(tokens)
}
