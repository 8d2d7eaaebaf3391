#![cfg(feature = "xml")]

use meridian_fhir::datatypes::{CodeableConcept, HumanName};
use meridian_fhir::resources::{
    Basic, Bundle, BundleEntry, Encounter, Observation, ObservationValue, Patient,
    PatientMultipleBirth,
};
use meridian_fhir::{DecodeError, Extension, ExtensionValue, FhirVersion, Resource};
use meridian_serde::json::{from_json_str, to_json_value};
use meridian_serde::xml::{
    XmlOptions, detect_version, from_xml_slice, from_xml_str, to_xml_string, to_xml_string_with,
    to_xml_vec,
};
use meridian_serde::Result;

#[test]
fn test_xml_serialize_simple_resource() -> Result<()> {
    let patient = Patient {
        id: Some("example".to_string()),
        ..Default::default()
    };

    let xml = to_xml_string(&patient)?;
    assert_eq!(xml, r#"<Patient xmlns="http://hl7.org/fhir" id="example"/>"#);
    Ok(())
}

#[test]
fn test_xml_serialize_nested_struct() -> Result<()> {
    let patient = Patient {
        id: Some("example".to_string()),
        name: vec![HumanName {
            family: Some("Doe".to_string()),
            given: vec!["John".to_string(), "Q".to_string()],
            ..Default::default()
        }],
        ..Default::default()
    };

    let xml = to_xml_string(&patient)?;
    assert_eq!(
        xml,
        r#"<Patient xmlns="http://hl7.org/fhir" id="example"><name><family value="Doe"/><given value="John"/><given value="Q"/></name></Patient>"#
    );
    Ok(())
}

#[test]
fn test_xml_serialize_with_primitive_extension() -> Result<()> {
    let patient: Patient = from_json_str(
        r#"{"resourceType":"Patient","birthDate":"1974-12-25","_birthDate":{"id":"bd1"}}"#,
    )?;

    let xml = to_xml_string(&patient)?;
    assert!(xml.contains(r#"<birthDate id="bd1" value="1974-12-25"/>"#), "{xml}");

    let back: Patient = from_xml_str(&xml)?;
    assert_eq!(back, patient);
    Ok(())
}

#[test]
fn test_xml_extension_only_primitive() -> Result<()> {
    let json = r#"{"resourceType":"Patient","_birthDate":{"extension":[{"url":"http://hl7.org/fhir/StructureDefinition/data-absent-reason","valueCode":"unknown"}]}}"#;
    let patient: Patient = from_json_str(json)?;

    let xml = to_xml_string(&patient)?;
    assert!(xml.contains(
        r#"<birthDate><extension url="http://hl7.org/fhir/StructureDefinition/data-absent-reason"><valueCode value="unknown"/></extension></birthDate>"#
    ), "{xml}");

    let back: Patient = from_xml_str(&xml)?;
    assert!(back.birth_date.is_none());
    assert_eq!(back, patient);
    Ok(())
}

#[test]
fn test_xml_keyword_field_and_choice() -> Result<()> {
    let xml = r#"<Encounter xmlns="http://hl7.org/fhir"><status value="finished"/><class><code value="AMB"/></class></Encounter>"#;
    let encounter: Encounter = from_xml_str(xml)?;
    assert_eq!(encounter.r#class.code.as_deref(), Some("AMB"));
    assert_eq!(to_xml_string(&encounter)?, xml);

    let patient = Patient {
        multiple_birth: Some(PatientMultipleBirth::Integer(2)),
        ..Default::default()
    };
    let xml = to_xml_string(&patient)?;
    assert!(xml.contains(r#"<multipleBirthInteger value="2"/>"#));
    Ok(())
}

#[test]
fn test_xml_duplicate_choice_rejected() {
    let xml = r#"<Patient xmlns="http://hl7.org/fhir"><deceasedBoolean value="true"/><deceasedDateTime value="2020-01-01"/></Patient>"#;
    let err = from_xml_str::<Patient>(xml).unwrap_err();
    assert!(matches!(err.as_decode(), Some(DecodeError::DuplicateChoice { .. })));
}

#[test]
fn test_xml_root_type_checks() {
    let err = from_xml_str::<Patient>(r#"<Observation xmlns="http://hl7.org/fhir"/>"#).unwrap_err();
    assert!(matches!(err.as_decode(), Some(DecodeError::TypeMismatch { .. })));

    let err = from_xml_str::<Resource>(r#"<Spaceship xmlns="http://hl7.org/fhir"/>"#).unwrap_err();
    assert!(matches!(err.as_decode(), Some(DecodeError::UnknownResourceType(_))));
}

#[test]
fn test_xml_contained_single_wrapper() -> Result<()> {
    let basic = Basic {
        id: Some("b1".to_string()),
        code: CodeableConcept::from_text("note"),
        contained: vec![
            Patient {
                id: Some("p1".to_string()),
                ..Default::default()
            }
            .into(),
            Observation {
                id: Some("o1".to_string()),
                status: "final".to_string(),
                code: CodeableConcept::from_text("x"),
                value: Some(ObservationValue::Boolean(true)),
                ..Default::default()
            }
            .into(),
        ],
        ..Default::default()
    };

    let xml = to_xml_string(&basic)?;
    assert_eq!(xml.matches("<contained>").count(), 1, "{xml}");
    assert!(xml.contains(r#"<contained><Patient id="p1"/><Observation id="o1">"#), "{xml}");
    assert!(!xml.contains(r#"xmlns="http://hl7.org/fhir" id="p1""#));

    let back: Basic = from_xml_str(&xml)?;
    assert_eq!(back, basic);
    Ok(())
}

#[test]
fn test_xml_contained_one_wrapper_per_resource() -> Result<()> {
    let xml = r#"<Basic xmlns="http://hl7.org/fhir"><contained><Patient id="p1"/></contained><contained><Patient id="p2"/></contained><code><text value="n"/></code></Basic>"#;
    let basic: Basic = from_xml_str(xml)?;
    let ids: Vec<_> = basic.contained.iter().filter_map(Resource::id).collect();
    assert_eq!(ids, ["p1", "p2"]);
    Ok(())
}

#[test]
fn test_xml_bundle_resource_wrapped_in_field() -> Result<()> {
    let bundle = Bundle {
        r#type: "collection".to_string(),
        entry: vec![BundleEntry {
            resource: Some(
                Patient {
                    id: Some("a".to_string()),
                    ..Default::default()
                }
                .into(),
            ),
            ..Default::default()
        }],
        ..Default::default()
    };

    let xml = to_xml_string(&bundle)?;
    assert_eq!(
        xml,
        r#"<Bundle xmlns="http://hl7.org/fhir"><type value="collection"/><entry><resource><Patient id="a"/></resource></entry></Bundle>"#
    );
    let back: Bundle = from_xml_str(&xml)?;
    assert_eq!(back, bundle);
    Ok(())
}

#[test]
fn test_xml_extension_url_attribute_and_nesting() -> Result<()> {
    let patient = Patient {
        extension: vec![Extension::complex(
            "http://example.org/outer",
            vec![Extension::new("inner", ExtensionValue::Boolean(true))],
        )],
        ..Default::default()
    };

    let xml = to_xml_string(&patient)?;
    assert!(xml.contains(
        r#"<extension url="http://example.org/outer"><extension url="inner"><valueBoolean value="true"/></extension></extension>"#
    ), "{xml}");
    let back: Patient = from_xml_str(&xml)?;
    assert_eq!(back, patient);
    Ok(())
}

#[test]
fn test_xml_escaping_and_narrative() -> Result<()> {
    let json = r#"{"resourceType":"Patient","text":{"status":"generated","div":"<div xmlns=\"http://www.w3.org/1999/xhtml\">Tom &amp; Jerry <br/></div>"},"name":[{"text":"O'Brien <\"the\" & co>"}]}"#;
    let patient: Patient = from_json_str(json)?;

    let xml = to_xml_string(&patient)?;
    assert!(xml.contains(r#"<div xmlns="http://www.w3.org/1999/xhtml">Tom &amp; Jerry <br/></div>"#), "{xml}");
    assert!(!xml.contains("<\"the\""));

    let back: Patient = from_xml_str(&xml)?;
    assert_eq!(back.name[0].text.as_deref(), Some(r#"O'Brien <"the" & co>"#));
    assert_eq!(back, patient);
    Ok(())
}

#[test]
fn test_xml_unknown_elements_preserved() -> Result<()> {
    let xml = r#"<Patient xmlns="http://hl7.org/fhir"><active value="true"/><flavour value="mint"/></Patient>"#;
    let patient: Patient = from_xml_str(xml)?;
    assert_eq!(patient.active, Some(true));
    assert_eq!(
        to_json_value(&patient)?,
        serde_json::json!({"resourceType": "Patient", "active": true, "flavour": "mint"})
    );
    assert_eq!(to_xml_string(&patient)?, xml);
    Ok(())
}

#[test]
fn test_xml_version_attribute() -> Result<()> {
    let patient = Patient::default();

    let plain = to_xml_string(&patient)?;
    assert!(!plain.contains("fhirVersion"));
    assert_eq!(detect_version(&plain)?, None);

    let options = XmlOptions {
        include_version: true,
        fhir_version: "R4".parse::<FhirVersion>()?,
    };
    let tagged = to_xml_string_with(&patient, &options)?;
    assert!(tagged.contains(r#"fhirVersion="4.0""#));
    assert_eq!(detect_version(&tagged)?, Some(FhirVersion::R4));

    // The attribute is informational; decoding ignores it.
    let back: Patient = from_xml_str(&tagged)?;
    assert_eq!(back, patient);
    Ok(())
}

#[test]
fn test_xml_vec_and_slice() -> Result<()> {
    let patient = Patient {
        gender: Some("unknown".to_string()),
        ..Default::default()
    };
    let bytes = to_xml_vec(&patient)?;
    let back: Patient = from_xml_slice(&bytes)?;
    assert_eq!(back, patient);
    Ok(())
}

#[test]
fn test_xml_accepts_declaration_and_whitespace() -> Result<()> {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Patient xmlns="http://hl7.org/fhir">
  <id value="pretty"/>
  <!-- comment -->
  <active value="false"/>
</Patient>
"#;
    let patient: Patient = from_xml_str(xml)?;
    assert_eq!(patient.id.as_deref(), Some("pretty"));
    assert_eq!(patient.active, Some(false));
    Ok(())
}

#[test]
fn test_xml_repeated_primitive_without_value_keeps_position() -> Result<()> {
    let xml = r#"<Patient xmlns="http://hl7.org/fhir"><name><given id="g0"/><given value="Bob"/></name></Patient>"#;
    let patient: Patient = from_xml_str(xml)?;
    assert_eq!(patient.name[0].given, ["Bob"]);
    assert_eq!(to_xml_string(&patient)?, xml);

    assert_eq!(
        to_json_value(&patient)?,
        serde_json::json!({
            "resourceType": "Patient",
            "name": [{"given": [null, "Bob"], "_given": [{"id": "g0"}, null]}]
        })
    );
    Ok(())
}

#[test]
fn test_json_to_xml_repeated_primitive_alignment() -> Result<()> {
    let json = r#"{"resourceType":"Patient","name":[{"given":["A",null,"C",null],"_given":[null,{"id":"b"},{"id":"c"},{"id":"d"}]}]}"#;
    let patient: Patient = from_json_str(json)?;

    let xml = to_xml_string(&patient)?;
    assert_eq!(
        xml,
        r#"<Patient xmlns="http://hl7.org/fhir"><name><given value="A"/><given id="b"/><given id="c" value="C"/><given id="d"/></name></Patient>"#
    );

    let back: Patient = from_xml_str(&xml)?;
    assert_eq!(back, patient);
    assert_eq!(to_json_value(&back)?, serde_json::from_str::<serde_json::Value>(json)?);
    Ok(())
}
