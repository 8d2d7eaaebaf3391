//! Model-level tests: contained resources through the node tree, and the
//! descriptor tables the derive macros generate for user-defined types.
use meridian_fhir::datatypes::{CodeableConcept, Quantity, Reference};
use meridian_fhir::meta::{Cardinality, PrimitiveKind, ValueKind, XmlForm};
use meridian_fhir::node::{ElementNode, FieldValue, PrimitiveValue, Value};
use meridian_fhir::primitives::Code;
use meridian_fhir::resources::{Observation, Patient};
use meridian_fhir::{
    DecodeError, DomainResource, FhirChoice, FhirElement, FhirResource, FhirValue, Resource,
};

/// Resource variants are boxed, so the enum stays pointer sized.
#[test]
fn test_resource_enum_size_is_reasonable() {
    let size = std::mem::size_of::<Resource>();
    assert!(size <= 16, "Resource enum is {size} bytes");
}

fn observation_with_contained() -> Observation {
    Observation {
        contained: vec![
            Patient {
                id: Some("db2b7000".to_string()),
                ..Default::default()
            }
            .into(),
        ],
        status: "final".to_string(),
        code: CodeableConcept::from_text("Body Weight"),
        subject: Some(Reference::to("#db2b7000")),
        ..Default::default()
    }
}

/// Converting a resource with contained resources through the node tree on a
/// small (2MB) thread stack.
#[test]
fn test_contained_round_trip_small_stack() {
    let handle = std::thread::Builder::new()
        .name("small-stack-test".into())
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let observation = observation_with_contained();
            let resource = Resource::from(observation.clone());

            let back = Resource::from_value(resource.to_value()).unwrap();
            let Resource::Observation(back) = back else {
                panic!("expected Observation");
            };
            assert_eq!(*back, observation);
            assert!(matches!(&back.contained[0], Resource::Patient(_)));
        })
        .unwrap();

    handle.join().unwrap();
}

#[test]
fn test_find_contained_by_local_reference() {
    let observation = observation_with_contained();
    let reference = observation.subject.as_ref().and_then(|s| s.reference.as_deref()).unwrap();

    let patient = observation.find_contained(reference).unwrap();
    assert_eq!(patient.resource_type(), "Patient");
    assert_eq!(patient.id(), Some("db2b7000"));
    assert!(observation.find_contained("#other").is_none());
}

#[test]
fn test_contained_slot_holds_resource_nodes() {
    let node = observation_with_contained().to_node();
    let (index, field) = Observation::descriptor().field("contained").unwrap();
    assert!(field.is_contained());

    let Some(FieldValue::List(values)) = &node.values[index] else {
        panic!("contained should be a list slot");
    };
    let Value::Element(patient) = &values[0] else {
        panic!("contained entries are element nodes");
    };
    assert!(patient.is_resource());
    assert_eq!(patient.descriptor.name, "Patient");
}

#[derive(Clone, Debug, Default, PartialEq, FhirElement)]
#[fhir(name = "Test.widget")]
struct Widget {
    #[fhir(xml_attr)]
    id: Option<String>,
    r#type: Code,
    #[fhir(rename = "sizeInMm")]
    size: Option<u32>,
    tags: Vec<String>,
    reading: Option<WidgetReading>,
}

#[derive(Clone, Debug, PartialEq, FhirChoice)]
enum WidgetReading {
    Quantity(Quantity),
    #[fhir(rename = "Text")]
    Note(String),
}

#[test]
fn test_derived_descriptor() {
    let descriptor = Widget::descriptor();
    assert_eq!(descriptor.name, "Test.widget");
    assert!(!descriptor.is_resource());

    let names: Vec<_> = descriptor.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, ["id", "type", "sizeInMm", "tags", "reading"]);

    let (_, id) = descriptor.field("id").unwrap();
    assert_eq!(id.xml, XmlForm::Attribute);

    let (_, kind) = descriptor.field("type").unwrap();
    assert!(kind.required);
    assert!(matches!(kind.kind, ValueKind::Primitive(PrimitiveKind::String)));

    let (_, size) = descriptor.field("sizeInMm").unwrap();
    assert!(matches!(size.kind, ValueKind::Primitive(PrimitiveKind::UnsignedInt)));

    let (_, tags) = descriptor.field("tags").unwrap();
    assert_eq!(tags.cardinality, Cardinality::List);

    let resolved = descriptor.resolve("readingText").unwrap();
    assert_eq!(resolved.field.name, "reading");
    assert_eq!(resolved.primitive(), Some(PrimitiveKind::String));
    assert!(descriptor.resolve("readingNote").is_none());
}

#[test]
fn test_derived_node_round_trip() {
    let widget = Widget {
        id: Some("w1".to_string()),
        r#type: "gear".to_string(),
        size: Some(12),
        tags: vec!["a".to_string(), "b".to_string()],
        reading: Some(WidgetReading::Note("spins".to_string())),
    };

    let node = widget.to_node();
    let (index, _) = Widget::descriptor().field("reading").unwrap();
    assert!(matches!(
        &node.values[index],
        Some(FieldValue::Single(Value::Choice { suffix: "Text", .. }))
    ));
    assert_eq!(Widget::from_node(node).unwrap(), widget);
    assert_eq!(WidgetReading::Note(String::new()).type_suffix(), "Text");
}

#[test]
fn test_derived_missing_required_field() {
    let node = ElementNode::empty(Widget::descriptor());
    let err = Widget::from_node(node).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::MissingRequiredField { type_name: "Test.widget", field: "type" }
    ));
}

#[test]
fn test_derived_choice_rejects_unknown_suffix() {
    let value = Value::Choice {
        suffix: "Colour",
        value: Box::new(Value::Primitive(PrimitiveValue::String("red".to_string()))),
    };
    let err = WidgetReading::from_value(value).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownChoice { suffix, .. } if suffix == "Colour"));
}

#[test]
fn test_unsigned_int_rejects_negative() {
    let mut node = ElementNode::empty(Widget::descriptor());
    node.values[1] = Some(FieldValue::Single(Value::Primitive(PrimitiveValue::String("gear".into()))));
    node.values[2] = Some(FieldValue::Single(Value::Primitive(PrimitiveValue::Integer(-1))));
    let err = Widget::from_node(node).unwrap_err();
    assert!(err.to_string().starts_with("Test.widget.sizeInMm:"), "{err}");
}

#[test]
fn test_resource_trait_constants() {
    assert_eq!(<Patient as FhirResource>::RESOURCE_TYPE, "Patient");
    let patient = Patient {
        id: Some("p".to_string()),
        ..Default::default()
    };
    assert_eq!(FhirResource::id(&patient), Some("p"));
}
