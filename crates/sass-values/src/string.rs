use crate::{ValueError, Value};
use std::sync::Arc;

/// A SassScript string. Quoting is presentation only: two strings with
/// the same text are equal regardless of it.
#[derive(Debug, Clone)]
pub struct SassString {
    text: Arc<str>,
    quoted: bool,
}

impl SassString {
    pub fn new(text: impl Into<Arc<str>>, quoted: bool) -> Self {
        SassString {
            text: text.into(),
            quoted,
        }
    }

    pub fn quoted(text: impl Into<Arc<str>>) -> Self {
        Self::new(text, true)
    }

    pub fn unquoted(text: impl Into<Arc<str>>) -> Self {
        Self::new(text, false)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// The string's length in Unicode scalar values, which is how Sass
    /// counts characters (not graphemes, not bytes).
    pub fn sass_length(&self) -> usize {
        self.text.chars().count()
    }

    /// Translate a one-based Sass index (negative counts from the end)
    /// into a zero-based scalar offset.
    pub fn sass_index(&self, index: &crate::SassNumber) -> Result<usize, ValueError> {
        let length = self.sass_length();
        sass_index_to_offset(index, length, "string")
    }
}

impl PartialEq for SassString {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for SassString {}

impl std::hash::Hash for SassString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use std::hash::Hash;

        self.text.hash(state);
    }
}

impl From<SassString> for Value {
    fn from(string: SassString) -> Self {
        Value::String(string)
    }
}

/// Shared 1-based index translation used by strings and lists.
pub(crate) fn sass_index_to_offset(
    index: &crate::SassNumber,
    length: usize,
    what: &'static str,
) -> Result<usize, ValueError> {
    let index = index.assert_int()?;
    let length = length as i64;
    let offset = if index > 0 { index - 1 } else { length + index };

    if index != 0 && (0..length).contains(&offset) {
        Ok(offset as usize)
    } else {
        Err(ValueError::BadIndex {
            index,
            length: length as usize,
            what,
        })
    }
}
