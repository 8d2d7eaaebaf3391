//! ER7 (pipe-delimited) parser.

use std::sync::Arc;

use crate::encoding::EncodingCharacters;
use crate::error::{Hl7Error, Result};
use crate::escape::{split_escaped, unescape};
use crate::model::{Component, Field, Message, Segment, Subcomponent, is_header};

/// Parser settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseOptions {
    /// Skip text before the first header segment and drop segments that fail
    /// to parse instead of rejecting the message.
    pub lenient: bool,
}

/// Parses an ER7 message with the default (strict) options.
pub fn parse(text: &str) -> Result<Message> {
    parse_with(text, &ParseOptions::default())
}

/// Parses an ER7 message.
///
/// Segments may be terminated by `\r`, `\n` or `\r\n`; blank lines are
/// ignored. Delimiters come from the leading `MSH` segment, or from the
/// `BHS`/`FHS` header of a batch or file. The version comes from MSH-12.
/// When MSH-14 holds a single character, lines starting with it continue the
/// previous segment.
pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Message> {
    if text.trim().is_empty() {
        return Err(Hl7Error::InvalidInput("empty message".to_string()));
    }

    let normalized = text.replace("\r\n", "\r").replace('\n', "\r");
    let mut lines = normalized
        .split('\r')
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_line_no, header_line) = loop {
        match lines.next() {
            Some((line_no, line)) if is_header_line(line) => break (line_no, line),
            Some((line_no, _)) if options.lenient => {
                tracing::debug!(line = line_no, "skipping text before MSH");
            }
            Some((line_no, _)) => {
                return Err(Hl7Error::parse(
                    line_no,
                    "message must start with an MSH, BHS or FHS segment",
                ));
            }
            None => return Err(Hl7Error::MissingRequiredSegment("MSH".to_string())),
        }
    };

    let mut encoding = read_encoding(header_line, header_line_no)?;
    let mut version = None;
    let mut seen_msh = false;
    let mut segments: Vec<Segment> = Vec::new();

    for (line_no, line) in std::iter::once((header_line_no, header_line)).chain(lines) {
        if let Some(marker) = encoding.continuation {
            if let Some(rest) = line.strip_prefix(marker) {
                let rest = rest.strip_prefix(encoding.field).unwrap_or(rest);
                if let Some(last) = segments.last_mut() {
                    last.extend_slots(parse_fields(rest, &encoding));
                }
                continue;
            }
        }

        match parse_segment(line, &encoding, line_no) {
            Ok(segment) => {
                if segment.name() == "MSH" && !seen_msh {
                    // Batches and files take their version and continuation
                    // character from the first message header.
                    seen_msh = true;
                    encoding = encoding.with_continuation(single_char(segment.field(14).value()));
                    version = Some(segment.field(12).value())
                        .filter(|v| !v.is_empty())
                        .map(str::to_string);
                }
                segments.push(segment);
            }
            Err(err) if options.lenient && !segments.is_empty() => {
                tracing::warn!(line = line_no, error = %err, "skipping malformed segment");
            }
            Err(err) => return Err(err),
        }
    }

    tracing::debug!(
        segments = segments.len(),
        version = version.as_deref().unwrap_or(""),
        "parsed HL7v2 message"
    );

    Ok(Message::new(
        segments.into_iter().map(Arc::new).collect(),
        encoding,
        version,
    ))
}

fn is_header_line(line: &str) -> bool {
    line.get(..3).is_some_and(is_header)
}

/// Reads the field separator (the character after the segment name) and
/// the encoding characters of an `MSH`, `BHS` or `FHS` line.
fn read_encoding(header: &str, line_no: usize) -> Result<EncodingCharacters> {
    let mut chars = header.chars().skip(3);
    let Some(field) = chars.next() else {
        return Err(Hl7Error::parse(line_no, "header segment too short"));
    };
    if field.is_ascii_alphanumeric() || field.is_whitespace() {
        return Err(Hl7Error::parse(
            line_no,
            format!("invalid field separator '{field}'"),
        ));
    }
    let msh2: String = chars.take_while(|&c| c != field).collect();
    Ok(EncodingCharacters::from_msh2(&msh2).with_field_separator(field))
}

fn single_char(value: &str) -> Option<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_segment(line: &str, encoding: &EncodingCharacters, line_no: usize) -> Result<Segment> {
    let (name, rest) = match line.split_once(encoding.field) {
        Some((name, rest)) => (name, Some(rest)),
        None => (line, None),
    };

    let mut fields = Vec::new();
    if is_header(name) {
        // Field 1 is the separator itself; field 2 is kept raw.
        fields.push(vec![Field::from_text(encoding.field)]);
        let rest = rest.unwrap_or_default();
        let (msh2, tail) = match rest.split_once(encoding.field) {
            Some((msh2, tail)) => (msh2, Some(tail)),
            None => (rest, None),
        };
        fields.push(vec![Field::from_text(msh2)]);
        if let Some(tail) = tail {
            fields.extend(parse_fields(tail, encoding));
        }
    } else if let Some(rest) = rest {
        fields.extend(parse_fields(rest, encoding));
    }

    Segment::new(name, fields).map_err(|err| Hl7Error::parse(line_no, err.to_string()))
}

fn parse_fields<'a>(
    text: &'a str,
    encoding: &'a EncodingCharacters,
) -> impl Iterator<Item = Vec<Field>> + 'a {
    split_escaped(text, encoding.field, encoding.escape)
        .into_iter()
        .map(move |slot| parse_repetitions(slot, encoding))
}

fn parse_repetitions(text: &str, encoding: &EncodingCharacters) -> Vec<Field> {
    if text.is_empty() {
        return Vec::new();
    }
    split_escaped(text, encoding.repetition, encoding.escape)
        .into_iter()
        .map(|repetition| parse_field(repetition, encoding))
        .collect()
}

fn parse_field(text: &str, encoding: &EncodingCharacters) -> Field {
    match text {
        "\"\"" => Field::null(),
        "" => Field::default(),
        _ => Field::new(
            split_escaped(text, encoding.component, encoding.escape)
                .into_iter()
                .map(|component| parse_component(component, encoding))
                .collect(),
        ),
    }
}

fn parse_component(text: &str, encoding: &EncodingCharacters) -> Component {
    if text.is_empty() {
        return Component::default();
    }
    Component::new(
        split_escaped(text, encoding.subcomponent, encoding.escape)
            .into_iter()
            .map(|sub| Subcomponent::new(unescape(sub, encoding)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADT: &str = "MSH|^~\\&|SND|SFAC|RCV|RFAC|20240101120000||ADT^A01|MSG00001|P|2.5\r\
                       PID|1||12345^^^HOSP~67890||Doe^John^Q||19800101|M\r\
                       NTE|1||Patient said \\T\\ more\\.br\\next line\r";

    #[test]
    fn test_parse_msh_numbering() {
        let message = parse(ADT).unwrap();
        let msh = message.msh().unwrap();
        assert_eq!(msh.field(1).value(), "|");
        assert_eq!(msh.field(2).value(), "^~\\&");
        assert_eq!(msh.field(3).value(), "SND");
        assert_eq!(msh.field(9).component(2).map(Component::value), Some("A01"));
        assert_eq!(message.control_id(), Some("MSG00001"));
        assert_eq!(message.version(), Some("2.5"));
    }

    #[test]
    fn test_parse_repetitions_components_and_escapes() {
        let message = parse(ADT).unwrap();
        let pid = message.segment("PID").unwrap();
        assert_eq!(pid.repetitions(3).len(), 2);
        assert_eq!(pid.repetitions(3)[1].value(), "67890");
        assert_eq!(pid.field(5).component(2).map(Component::value), Some("John"));
        assert!(pid.field(2).is_empty());

        let nte = message.segment("NTE").unwrap();
        assert_eq!(nte.field(3).value(), "Patient said & more\nnext line");
    }

    #[test]
    fn test_line_terminators() {
        let crlf = ADT.replace('\r', "\r\n");
        let lf = ADT.replace('\r', "\n\n");
        assert_eq!(parse(&crlf).unwrap(), parse(ADT).unwrap());
        assert_eq!(parse(&lf).unwrap().segments().len(), 3);
    }

    #[test]
    fn test_trailing_spaces_are_data() {
        let text = "MSH|^~\\&|A\rNTE|1||padded value   \r  \rZZZ|a^b  \r";
        let message = parse(text).unwrap();
        assert_eq!(message.segments().len(), 3);
        assert_eq!(message.segment("NTE").unwrap().field(3).value(), "padded value   ");
        let zzz = message.segment("ZZZ").unwrap();
        assert_eq!(zzz.field(1).component(2).map(Component::value), Some("b  "));

        let written = crate::serializer::to_er7(&message).unwrap();
        assert_eq!(written, "MSH|^~\\&|A\rNTE|1||padded value   \rZZZ|a^b  \r");
    }

    #[test]
    fn test_custom_delimiters() {
        let message = parse("MSH#$%/!#APP\rPID#1#A$B%C").unwrap();
        let encoding = message.encoding();
        assert_eq!(encoding.field, '#');
        assert_eq!(encoding.component, '$');
        let pid = message.segment("PID").unwrap();
        assert_eq!(pid.field(2).component(2).map(Component::value), Some("B"));
        assert_eq!(pid.repetitions(2).len(), 2);
    }

    #[test]
    fn test_null_field() {
        let message = parse("MSH|^~\\&|A\rPID|1|\"\"").unwrap();
        let pid = message.segment("PID").unwrap();
        assert!(pid.field(2).is_null());
    }

    #[test]
    fn test_strict_requires_msh_first() {
        let err = parse("PID|1\rMSH|^~\\&|A").unwrap_err();
        assert!(matches!(err, Hl7Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_lenient_skips_leading_text_and_bad_segments() {
        let text = "garbage\rMSH|^~\\&|A\rTOOLONG|1\rPID|1";
        assert!(parse(text).is_err());

        let message = parse_with(text, &ParseOptions { lenient: true }).unwrap();
        let names: Vec<_> = message.segments().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["MSH", "PID"]);
    }

    #[test]
    fn test_bad_segment_reports_line() {
        let err = parse("MSH|^~\\&|A\r\rPD|1").unwrap_err();
        assert!(matches!(err, Hl7Error::Parse { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_empty_and_missing_msh() {
        assert!(matches!(parse("  \r\n"), Err(Hl7Error::InvalidInput(_))));
        assert!(matches!(
            parse_with("PID|1", &ParseOptions { lenient: true }),
            Err(Hl7Error::MissingRequiredSegment(name)) if name == "MSH"
        ));
    }

    #[test]
    fn test_batch_header_first() {
        let text = "BHS|^~\\&|SND\rMSH|^~\\&|SND||||||ADT^A01|1|P|2.4\rPID|1\rBTS|1";
        let message = parse(text).unwrap();
        let names: Vec<_> = message.segments().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["BHS", "MSH", "PID", "BTS"]);
        let bhs = message.segment("BHS").unwrap();
        assert_eq!(bhs.field(2).value(), "^~\\&");
        assert_eq!(bhs.field(3).value(), "SND");
        assert_eq!(message.version(), Some("2.4"));
    }

    #[test]
    fn test_continuation_lines() {
        let text = "MSH|^~\\&|A|||||||||||+\rOBX|1|TX|\r+|more|text";
        let message = parse(text).unwrap();
        assert_eq!(message.encoding().continuation, Some('+'));
        let obx = message.segment("OBX").unwrap();
        assert_eq!(obx.field(4).value(), "more");
        assert_eq!(obx.field(5).value(), "text");
        assert_eq!(message.segments().len(), 2);
    }
}
