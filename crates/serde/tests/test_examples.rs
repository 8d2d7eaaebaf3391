//! Round-trips every fixture under `tests/data` through JSON and XML and checks
//! that the re-serialized JSON matches the original document.

use meridian_fhir::Resource;
use meridian_serde::json::{from_json_value, to_json_value};
#[cfg(feature = "xml")]
use meridian_serde::xml::{from_xml_str, to_xml_string};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[test]
fn test_json_examples() {
    let checked = test_examples_in_dir(&examples_dir(), |json| {
        let resource: Resource = from_json_value(json).map_err(|e| e.to_string())?;
        to_json_value(&resource).map_err(|e| e.to_string())
    });
    assert!(checked >= 5, "expected the bundled fixtures, found {checked}");
}

#[cfg(feature = "xml")]
#[test]
fn test_xml_examples() {
    let checked = test_examples_in_dir(&examples_dir(), |json| {
        let resource: Resource = from_json_value(json).map_err(|e| e.to_string())?;
        let xml = to_xml_string(&resource).map_err(|e| e.to_string())?;
        let back: Resource = from_xml_str(&xml).map_err(|e| format!("{e}\n{xml}"))?;
        to_json_value(&back).map_err(|e| e.to_string())
    });
    assert!(checked >= 5, "expected the bundled fixtures, found {checked}");
}

fn examples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

/// Runs `roundtrip` on every JSON file in `dir`; panics listing all files whose
/// output differs. Returns the number of files checked.
fn test_examples_in_dir<F>(dir: &Path, roundtrip: F) -> usize
where
    F: Fn(&Value) -> Result<Value, String>,
{
    let mut failures: Vec<String> = Vec::new();
    let mut checked = 0;

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        println!("Processing file: {}", path.display());
        let content = fs::read_to_string(&path).unwrap();
        let original: Value = serde_json::from_str(&content).unwrap();

        match roundtrip(&original) {
            Ok(reserialized) => {
                if reserialized.get("resourceType") != original.get("resourceType") {
                    failures.push(format!("{}: resourceType changed", path.display()));
                }
                let first_key = reserialized.as_object().and_then(|o| o.keys().next().cloned());
                if first_key.as_deref() != Some("resourceType") {
                    failures.push(format!("{}: resourceType is not the first key", path.display()));
                }
                for (diff_path, orig_val, new_val) in find_json_differences(&original, &reserialized) {
                    failures.push(format!(
                        "{}: {}\n    Original: {}\n    Reserialized: {}",
                        path.display(),
                        diff_path,
                        orig_val,
                        new_val
                    ));
                }
            }
            Err(e) => failures.push(format!("{}: {}", path.display(), e)),
        }
        checked += 1;
    }

    assert!(failures.is_empty(), "round-trip failures:\n{}", failures.join("\n"));
    checked
}

fn find_json_differences(original: &Value, reserialized: &Value) -> Vec<(String, Value, Value)> {
    let mut differences = Vec::new();
    compare_json_values(original, reserialized, String::new(), &mut differences);
    differences
}

// Recursively compare JSON values and collect differences
fn compare_json_values(
    original: &Value,
    reserialized: &Value,
    path: String,
    differences: &mut Vec<(String, Value, Value)>,
) {
    match (original, reserialized) {
        (Value::Object(orig_obj), Value::Object(reser_obj)) => {
            for (key, orig_val) in orig_obj {
                let new_path = join(&path, key);
                match reser_obj.get(key) {
                    Some(reser_val) => compare_json_values(orig_val, reser_val, new_path, differences),
                    None => differences.push((new_path, orig_val.clone(), Value::Null)),
                }
            }
            for (key, reser_val) in reser_obj {
                if !orig_obj.contains_key(key) {
                    differences.push((join(&path, key), Value::Null, reser_val.clone()));
                }
            }
        }
        (Value::Array(orig_arr), Value::Array(reser_arr)) if orig_arr.len() == reser_arr.len() => {
            for (i, (orig_val, reser_val)) in orig_arr.iter().zip(reser_arr).enumerate() {
                compare_json_values(orig_val, reser_val, format!("{path}[{i}]"), differences);
            }
        }
        _ => {
            if original != reserialized {
                differences.push((path, original.clone(), reserialized.clone()));
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
