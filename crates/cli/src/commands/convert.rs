use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, ValueEnum};
use meridian_fhir::{FhirVersion, Resource};
use meridian_serde::json::{from_json_str, to_json_string, to_json_string_pretty};
use meridian_serde::xml::{XmlOptions, detect_version, from_xml_str, to_xml_string_with};

use super::read_input;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// XML when the first non-whitespace character opens a tag.
    fn detect(input: &str) -> Self {
        match input.trim_start().chars().next() {
            Some('<') => Format::Xml,
            _ => Format::Json,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConvertCommand {
    /// Input resource (JSON or XML, detected from content); `-` for stdin
    input: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    to: Format,

    /// FHIR version written to the XML `fhirVersion` attribute
    #[arg(long, env = "MERIDIAN_FHIR_VERSION")]
    fhir_version: Option<FhirVersion>,

    /// Tag XML output with the `fhirVersion` attribute
    #[arg(long)]
    include_version: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

impl ConvertCommand {
    pub fn execute(self) -> anyhow::Result<ExitCode> {
        let input = read_input(&self.input)?;
        let output = convert(&input, self.to, self.fhir_version, self.include_version, self.pretty)
            .with_context(|| format!("failed to convert {}", self.input.display()))?;
        println!("{output}");
        Ok(ExitCode::SUCCESS)
    }
}

fn convert(
    input: &str,
    to: Format,
    fhir_version: Option<FhirVersion>,
    include_version: bool,
    pretty: bool,
) -> anyhow::Result<String> {
    let from = Format::detect(input);
    let (resource, detected): (Resource, _) = match from {
        Format::Json => (from_json_str(input)?, None),
        Format::Xml => (from_xml_str(input)?, detect_version(input)?),
    };
    tracing::debug!(
        from = ?from,
        to = ?to,
        resource_type = resource.resource_type(),
        "converting resource"
    );

    let output = match to {
        Format::Json if pretty => to_json_string_pretty(&resource)?,
        Format::Json => to_json_string(&resource)?,
        Format::Xml => {
            let options = XmlOptions {
                include_version,
                fhir_version: fhir_version.or(detected).unwrap_or_default(),
            };
            to_xml_string_with(&resource, &options)?
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENT_JSON: &str = r#"{"resourceType":"Patient","id":"example","active":true}"#;

    #[test]
    fn test_detect_format() {
        assert_eq!(Format::detect("  \n<Patient/>"), Format::Xml);
        assert_eq!(Format::detect(PATIENT_JSON), Format::Json);
    }

    #[test]
    fn test_json_to_xml_and_back() {
        let xml = convert(PATIENT_JSON, Format::Xml, None, false, false).unwrap();
        assert_eq!(
            xml,
            r#"<Patient xmlns="http://hl7.org/fhir" id="example"><active value="true"/></Patient>"#
        );
        let json = convert(&xml, Format::Json, None, false, false).unwrap();
        assert_eq!(json, PATIENT_JSON);
    }

    #[test]
    fn test_version_tagging() {
        let tagged = convert(PATIENT_JSON, Format::Xml, Some(FhirVersion::R5), true, false).unwrap();
        assert!(tagged.contains(r#"fhirVersion="5.0""#), "{tagged}");

        // Without an explicit version the source document's tag is kept.
        let again = convert(&tagged, Format::Xml, None, true, false).unwrap();
        assert!(again.contains(r#"fhirVersion="5.0""#), "{again}");

        let untagged = convert(&tagged, Format::Xml, None, false, false).unwrap();
        assert!(!untagged.contains("fhirVersion"));
    }

    #[test]
    fn test_pretty_json() {
        let pretty = convert(PATIENT_JSON, Format::Json, None, false, true).unwrap();
        assert!(pretty.starts_with("{\n  \"resourceType\": \"Patient\""));
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        assert!(convert(r#"{"resourceType":"Spaceship"}"#, Format::Xml, None, false, false).is_err());
        assert!(convert("<Patient", Format::Json, None, false, false).is_err());
    }
}
