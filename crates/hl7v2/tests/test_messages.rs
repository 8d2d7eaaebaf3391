use meridian_hl7v2::{
    AckCode, AckOptions, BatchOptions, Component, MergeStrategy, Message, Result, compare,
    create_batch, extract_ack_errors, generate_ack, json, merge, merge_by_segment_type, parse,
    read_ack, split_batch, to_er7,
};
use serde_json::json;

const ADT_A01: &str = "MSH|^~\\&|SND|SND_FAC|RCV|RCV_FAC|20240315083000||ADT^A01^ADT_A01|MSG00001|P|2.5\r\
                       EVN|A01|20240315083000\r\
                       PID|1||12345^^^HOSP^MR||Doe^John^Q||19800101|M\r\
                       PV1|1|I|WARD^101^A\r";

fn adt() -> Message {
    parse(ADT_A01).unwrap()
}

fn message_with_pid(control_id: &str, patient: &str) -> Message {
    parse(&format!(
        "MSH|^~\\&|SND|F|RCV|F|20240101000000||ADT^A08|{control_id}|P|2.5\rPID|1||{patient}\rNTE|1||{control_id}"
    ))
    .unwrap()
}

#[test]
fn test_ack_for_adt() -> Result<()> {
    let ack = generate_ack(&adt(), AckCode::Accept, &AckOptions::default())?;

    let msa = ack.segment("MSA").unwrap();
    assert_eq!(msa.field(1).value(), "AA");
    assert_eq!(msa.field(2).value(), "MSG00001");

    let msh = ack.msh().unwrap();
    assert_eq!(msh.field(3).value(), "RCV");
    assert_eq!(msh.field(4).value(), "RCV_FAC");
    assert_eq!(msh.field(5).value(), "SND");
    assert_eq!(msh.field(6).value(), "SND_FAC");
    let message_type: Vec<_> = msh.field(9).components().iter().map(Component::value).collect();
    assert_eq!(message_type, ["ACK", "ADT", "A01"]);
    assert_ne!(msh.field(10).value(), "MSG00001");
    assert!(msh.field(10).value().len() <= 20);
    assert_eq!(msh.field(11).value(), "P");
    assert_eq!(ack.version(), Some("2.5"));
    assert_eq!(ack.encoding(), adt().encoding());
    Ok(())
}

#[test]
fn test_ack_overrides_and_text() -> Result<()> {
    let options = AckOptions {
        text: Some("Unknown ward".to_string()),
        application: Some("GATEWAY".to_string()),
        facility: None,
    };
    let ack = generate_ack(&adt(), AckCode::Error, &options)?;
    assert_eq!(ack.msh().unwrap().field(3).value(), "GATEWAY");
    assert_eq!(ack.msh().unwrap().field(4).value(), "RCV_FAC");

    let msa = ack.segment("MSA").unwrap();
    assert_eq!(msa.field(1).value(), "AE");
    assert_eq!(msa.field(3).value(), "Unknown ward");

    let text = to_er7(&ack)?;
    assert!(text.ends_with("\rMSA|AE|MSG00001|Unknown ward\r"), "{text:?}");
    let reparsed = parse(&text)?;
    assert!(compare(&reparsed, &ack).identical());
    Ok(())
}

#[test]
fn test_ack_keeps_custom_delimiters() -> Result<()> {
    let original = parse("MSH#$%/!#APP#FAC#DEST#DFAC#20240101000000##ORU$R01#C1#T#2.3")?;
    let ack = generate_ack(&original, AckCode::Reject, &AckOptions::default())?;
    let text = to_er7(&ack)?;
    assert!(text.starts_with("MSH#$%/!#DEST#DFAC#APP#FAC#"), "{text:?}");
    assert!(text.contains("#ACK$ORU$R01#"), "{text:?}");
    assert!(text.ends_with("#T#2.3\rMSA#AR#C1\r"), "{text:?}");
    Ok(())
}

#[test]
fn test_compare_identical() {
    let message = adt();
    let diff = compare(&message, &message);
    assert!(diff.identical());
    assert!(compare(&message, &adt()).identical());
}

#[test]
fn test_compare_single_field_difference() {
    let changed = parse(&ADT_A01.replace("Doe^John^Q", "Roe^Jane")).unwrap();
    let diff = compare(&adt(), &changed);

    assert!(!diff.identical());
    assert!(diff.structural.is_empty());
    assert!(diff.segments.is_empty());
    assert_eq!(diff.fields.len(), 1);
    let field = &diff.fields[0];
    assert_eq!((field.segment.as_str(), field.field, field.position), ("PID", 5, 2));
    assert_eq!((field.message1.as_str(), field.message2.as_str()), ("Doe", "Roe"));

    let report = diff.to_string();
    assert!(report.contains("Messages are DIFFERENT"));
    assert!(report.contains("  Field differences: 1"));
}

#[test]
fn test_compare_is_symmetric() {
    let shorter = parse("MSH|^~\\&|SND|SND_FAC|RCV|RCV_FAC|20240315083000||ADT^A01^ADT_A01|MSG00001|P|2.4\rEVN|A01").unwrap();
    let forward = compare(&adt(), &shorter);
    let backward = compare(&shorter, &adt());

    assert_eq!(forward.structural.len(), backward.structural.len());
    assert_eq!(forward.segments.len(), backward.segments.len());
    assert_eq!(forward.fields.len(), backward.fields.len());
    assert_eq!(forward.segments.len(), 2);
    assert_eq!(forward.segments[0].message2, "<missing>");
    assert_eq!(backward.segments[0].message1, "<missing>");
    assert!(forward.structural.contains(&"Segment count mismatch: 4 vs 2".to_string()));
}

#[test]
fn test_diff_json_report() {
    let changed = parse(&ADT_A01.replace("PV1|1|I", "PV1|1|O")).unwrap();
    let report = serde_json::to_value(compare(&adt(), &changed)).unwrap();
    assert_eq!(report["identical"], json!(false));
    assert_eq!(
        report["fields"],
        json!([{"segment": "PV1", "position": 3, "field": 2, "message1": "I", "message2": "O"}])
    );
}

#[test]
fn test_merge_unique_keeps_first_pid() -> Result<()> {
    let messages = [
        message_with_pid("M1", "111"),
        message_with_pid("M2", "222"),
        message_with_pid("M3", "333"),
    ];
    let merged = merge(&messages, MergeStrategy::Unique, true)?;

    let pids = merged.get_segments("PID");
    assert_eq!(pids.len(), 1);
    assert_eq!(pids[0].field(3).value(), "111");
    assert_eq!(merged.control_id(), Some("M1"));
    Ok(())
}

#[test]
fn test_merge_replace_keeps_last_pid_at_last_position() -> Result<()> {
    let messages = [
        message_with_pid("M1", "111"),
        message_with_pid("M2", "222"),
        message_with_pid("M3", "333"),
    ];
    let merged = merge(&messages, MergeStrategy::Replace, true)?;

    let names: Vec<_> = merged.segments().iter().map(|s| s.name()).collect();
    assert_eq!(names, ["MSH", "PID", "NTE"]);
    assert_eq!(merged.get_segments("PID")[0].field(3).value(), "333");
    assert_eq!(merged.get_segments("NTE")[0].field(3).value(), "M3");
    Ok(())
}

#[test]
fn test_merge_append_and_by_type() -> Result<()> {
    let messages = [message_with_pid("M1", "111"), message_with_pid("M2", "222")];

    let appended = merge(&messages, "append".parse()?, true)?;
    assert_eq!(appended.segments().len(), 5);
    assert_eq!(appended.get_segments("MSH").len(), 1);

    let pids_only = merge_by_segment_type(&messages, Some(&["PID"][..]))?;
    let names: Vec<_> = pids_only.segments().iter().map(|s| s.name()).collect();
    assert_eq!(names, ["MSH", "PID", "PID"]);

    let everything = merge_by_segment_type(&messages, None)?;
    assert_eq!(everything, appended);
    Ok(())
}

#[test]
fn test_ack_read_back() -> Result<()> {
    let options = AckOptions {
        text: Some("PID-3 missing".to_string()),
        ..Default::default()
    };
    let ack = generate_ack(&adt(), AckCode::Error, &options)?;
    let reparsed = parse(&to_er7(&ack)?)?;

    let status = read_ack(&reparsed)?;
    assert_eq!(status.code, AckCode::Error);
    assert_eq!(status.control_id.as_deref(), Some("MSG00001"));
    assert_eq!(extract_ack_errors(&reparsed)?, ["MSA Text Message: PID-3 missing"]);
    Ok(())
}

#[test]
fn test_batch_through_json() -> Result<()> {
    let messages = vec![adt(), message_with_pid("MSG2", "222")];
    let batch = create_batch(&messages, &BatchOptions::default())?;

    let text = json::to_json_string_pretty(&batch)?;
    let decoded = json::from_json_str(&text)?;
    assert_eq!(decoded, batch);
    assert_eq!(split_batch(&decoded), messages);
    Ok(())
}
