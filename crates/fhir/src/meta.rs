//! Field metadata model.
//!
//! Every model type carries a `'static` [`TypeDescriptor`] generated by
//! `#[derive(FhirElement)]`. The descriptor lists the fields in declaration
//! order together with their wire name, cardinality and value kind, and is the
//! single source of truth the JSON and XML codecs consult when walking a
//! resource graph.

use std::borrow::Cow;

/// Describes one model type (resource, datatype, backbone element or `Extension`).
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Type name. For resources this is the `resourceType`.
    pub name: &'static str,
    pub kind: TypeKind,
    /// Fields in declaration order.
    pub fields: &'static [FieldDescriptor],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Datatype or backbone element.
    Element,
    /// A resource; encoded with `resourceType` (JSON) or as a typed element (XML).
    Resource,
    /// The recursive `Extension` type.
    Extension,
}

/// Describes one field of a [`TypeDescriptor`].
#[derive(Debug)]
pub struct FieldDescriptor {
    /// Wire name. For choice groups this is the prefix (`value` for `value[x]`).
    pub name: &'static str,
    pub cardinality: Cardinality,
    /// `true` when the field is declared without `Option`/`Vec`.
    pub required: bool,
    pub kind: ValueKind,
    pub xml: XmlForm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    Single,
    List,
}

/// How a field is represented in XML.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlForm {
    Element,
    Attribute,
}

/// What kind of value a field (or a choice variant) holds.
#[derive(Clone, Copy, Debug)]
pub enum ValueKind {
    Primitive(PrimitiveKind),
    /// Nested datatype or backbone element, described by its own table.
    Composite(fn() -> &'static TypeDescriptor),
    Extension,
    /// Any resource; the concrete table is looked up through the registry by `resourceType`.
    Resource,
    /// A `value[x]` group.
    Choice(&'static [ChoiceVariant]),
}

/// One concrete type of a choice group.
#[derive(Debug)]
pub struct ChoiceVariant {
    /// Appended to the field name to form the wire key (`Quantity` → `valueQuantity`).
    pub suffix: &'static str,
    pub kind: ValueKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    UnsignedInt,
    Decimal,
    /// Every string-shaped FHIR primitive (string, code, uri, date, dateTime, ...).
    String,
    /// Narrative XHTML; raw markup in XML, a string in JSON.
    Xhtml,
}

/// A wire key resolved against a [`TypeDescriptor`].
#[derive(Clone, Copy, Debug)]
pub struct Resolved {
    pub index: usize,
    pub field: &'static FieldDescriptor,
    pub variant: Option<&'static ChoiceVariant>,
}

impl Resolved {
    /// Kind of the concrete value behind the key.
    pub fn kind(&self) -> ValueKind {
        self.variant.map_or(self.field.kind, |variant| variant.kind)
    }

    pub fn primitive(&self) -> Option<PrimitiveKind> {
        self.kind().primitive()
    }
}

impl TypeDescriptor {
    pub fn is_resource(&self) -> bool {
        self.kind == TypeKind::Resource
    }

    /// Finds a field by its declared wire name.
    pub fn field(&self, name: &str) -> Option<(usize, &'static FieldDescriptor)> {
        let fields: &'static [FieldDescriptor] = self.fields;
        fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Maps a wire key to a field. Plain fields match by name; choice groups match
    /// by prefix plus one of their variant suffixes.
    pub fn resolve(&self, key: &str) -> Option<Resolved> {
        let fields: &'static [FieldDescriptor] = self.fields;
        if let Some((index, field)) = fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.name == key && !f.is_choice())
        {
            return Some(Resolved {
                index,
                field,
                variant: None,
            });
        }
        fields.iter().enumerate().find_map(|(index, field)| {
            let variants = field.choice_variants()?;
            let suffix = key.strip_prefix(field.name)?;
            variants
                .iter()
                .find(|v| v.suffix == suffix)
                .map(|variant| Resolved {
                    index,
                    field,
                    variant: Some(variant),
                })
        })
    }
}

impl FieldDescriptor {
    pub fn is_list(&self) -> bool {
        self.cardinality == Cardinality::List
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, ValueKind::Choice(_))
    }

    pub fn is_attribute(&self) -> bool {
        self.xml == XmlForm::Attribute
    }

    /// The `contained` list of a domain resource.
    pub fn is_contained(&self) -> bool {
        self.name == "contained" && self.is_list() && matches!(self.kind, ValueKind::Resource)
    }

    pub fn choice_variants(&self) -> Option<&'static [ChoiceVariant]> {
        match self.kind {
            ValueKind::Choice(variants) => Some(variants),
            _ => None,
        }
    }

    /// Wire key for this field, with the variant suffix for choice groups.
    pub fn wire_name(&self, suffix: Option<&str>) -> Cow<'static, str> {
        match suffix {
            Some(suffix) => Cow::Owned(format!("{}{}", self.name, suffix)),
            None => Cow::Borrowed(self.name),
        }
    }
}

impl ValueKind {
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            ValueKind::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive().is_some()
    }
}
