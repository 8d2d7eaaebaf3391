//! ER7 escape sequences.
//!
//! | Sequence | Meaning |
//! |----------|---------|
//! | `\F\` | field separator |
//! | `\S\` | component separator |
//! | `\T\` | subcomponent separator |
//! | `\R\` | repetition separator |
//! | `\E\` | escape character |
//! | `\.br\` | line break |
//! | `\Xhh..\` | hex encoded bytes (UTF-8) |
//!
//! Any other sequence is kept verbatim, delimiters included.

use std::borrow::Cow;

use crate::encoding::EncodingCharacters;

/// Escapes delimiters and line breaks in `text` for writing.
pub fn escape<'a>(text: &'a str, encoding: &EncodingCharacters) -> Cow<'a, str> {
    if !text
        .chars()
        .any(|c| encoding.is_delimiter(c) || c == '\n' || c == '\r')
    {
        return Cow::Borrowed(text);
    }

    let esc = encoding.escape;
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        let code = match c {
            c if c == esc => "E",
            c if c == encoding.field => "F",
            c if c == encoding.component => "S",
            c if c == encoding.subcomponent => "T",
            c if c == encoding.repetition => "R",
            '\n' => ".br",
            '\r' => "X0D",
            _ => {
                out.push(c);
                continue;
            }
        };
        out.push(esc);
        out.push_str(code);
        out.push(esc);
    }
    Cow::Owned(out)
}

/// Resolves escape sequences in `text`.
pub fn unescape<'a>(text: &'a str, encoding: &EncodingCharacters) -> Cow<'a, str> {
    let esc = encoding.escape;
    if !text.contains(esc) {
        return Cow::Borrowed(text);
    }

    let esc_len = esc.len_utf8();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(esc) {
        out.push_str(&rest[..start]);
        let after = &rest[start + esc_len..];
        let Some(end) = after.find(esc) else {
            // Unterminated: the escape character is literal.
            out.push_str(&rest[start..]);
            return Cow::Owned(out);
        };

        let sequence = &after[..end];
        match decode_sequence(sequence, encoding) {
            Some(decoded) => out.push_str(&decoded),
            None => out.push_str(&rest[start..start + esc_len + end + esc_len]),
        }
        rest = &after[end + esc_len..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_sequence(sequence: &str, encoding: &EncodingCharacters) -> Option<String> {
    let single = |c: char| Some(c.to_string());
    match sequence {
        "F" => single(encoding.field),
        "S" => single(encoding.component),
        "T" => single(encoding.subcomponent),
        "R" => single(encoding.repetition),
        "E" => single(encoding.escape),
        ".br" => single('\n'),
        _ => {
            let hex = sequence.strip_prefix('X')?;
            decode_hex(hex)
        }
    }
}

fn decode_hex(hex: &str) -> Option<String> {
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

/// Splits `text` on `separator`, leaving separators that sit inside an
/// escape sequence alone. An escape character with no closing partner is
/// treated as literal text.
pub(crate) fn split_escaped(text: &str, separator: char, escape: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_escape = false;
    for (i, c) in text.char_indices() {
        if c == escape {
            if in_escape {
                in_escape = false;
            } else if text[i + c.len_utf8()..].contains(escape) {
                in_escape = true;
            }
        } else if c == separator && !in_escape {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}
