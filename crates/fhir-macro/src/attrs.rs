use syn::{Attribute, LitStr};

/// Options read from `#[fhir(...)]` on a struct or enum.
#[derive(Default)]
pub struct ContainerAttrs {
    pub resource: bool,
    pub domain: bool,
    pub extension: bool,
    pub name: Option<String>,
}

/// Options read from `#[fhir(...)]` on a field or variant.
#[derive(Default)]
pub struct FieldAttrs {
    pub rename: Option<String>,
    pub xml_attr: bool,
    pub extras: bool,
}

impl ContainerAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("fhir")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("resource") {
                    out.resource = true;
                } else if meta.path.is_ident("domain") {
                    out.domain = true;
                } else if meta.path.is_ident("extension") {
                    out.extension = true;
                } else if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.name = Some(lit.value());
                } else {
                    return Err(meta.error("unsupported fhir container attribute"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("fhir")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());
                } else if meta.path.is_ident("xml_attr") {
                    out.xml_attr = true;
                } else if meta.path.is_ident("extras") {
                    out.extras = true;
                } else {
                    return Err(meta.error("unsupported fhir field attribute"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}
