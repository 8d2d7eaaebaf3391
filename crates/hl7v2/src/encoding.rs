//! Message delimiters declared by MSH-1 and MSH-2.

use serde::Serialize;

/// The five delimiters of an ER7 message plus the optional continuation
/// character. Every split, join and escape in this crate is parameterized by
/// a value of this type; nothing assumes the default `|^~\&`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EncodingCharacters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
    pub continuation: Option<char>,
}

impl Default for EncodingCharacters {
    fn default() -> Self {
        EncodingCharacters {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
            continuation: None,
        }
    }
}

impl EncodingCharacters {
    /// Reads MSH-2 (component, repetition, escape, subcomponent, in that
    /// order). An MSH-2 shorter than four characters falls back to the
    /// defaults as a whole.
    pub fn from_msh2(msh2: &str) -> Self {
        let mut chars = msh2.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some(component), Some(repetition), Some(escape), Some(subcomponent)) => {
                EncodingCharacters {
                    component,
                    repetition,
                    escape,
                    subcomponent,
                    ..Default::default()
                }
            }
            _ => EncodingCharacters::default(),
        }
    }

    pub fn with_field_separator(self, field: char) -> Self {
        EncodingCharacters { field, ..self }
    }

    pub fn with_continuation(self, continuation: Option<char>) -> Self {
        EncodingCharacters {
            continuation,
            ..self
        }
    }

    /// The MSH-2 value for these delimiters.
    pub fn msh2(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }

    pub fn is_delimiter(&self, c: char) -> bool {
        c == self.field
            || c == self.component
            || c == self.repetition
            || c == self.escape
            || c == self.subcomponent
    }
}
