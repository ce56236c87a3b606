use crate::string::sass_index_to_offset;
use crate::{SassNumber, Value, ValueError};
use std::sync::Arc;

/// How a list's elements are joined when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSeparator {
    Comma,
    Space,
    Slash,
    /// A list whose separator has not been observed, such as a
    /// single-element or empty literal.
    Undecided,
}

/// An immutable SassScript list.
///
/// Two non-empty lists are equal when their separator, bracketing, and
/// contents all match. Empty lists are equal to each other regardless
/// of either flag, and to the empty map.
#[derive(Debug, Clone)]
pub struct SassList {
    contents: Arc<[Value]>,
    separator: ListSeparator,
    brackets: bool,
}

impl SassList {
    pub fn new(
        contents: impl IntoIterator<Item = Value>,
        separator: ListSeparator,
        brackets: bool,
    ) -> Self {
        SassList {
            contents: contents.into_iter().collect(),
            separator,
            brackets,
        }
    }

    /// An empty, unbracketed list with an undecided separator.
    pub fn empty() -> Self {
        Self::new([], ListSeparator::Undecided, false)
    }

    pub fn contents(&self) -> &[Value] {
        &self.contents
    }

    pub fn separator(&self) -> ListSeparator {
        self.separator
    }

    pub fn has_brackets(&self) -> bool {
        self.brackets
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.contents.iter()
    }

    /// Translate a one-based Sass index (negative counts from the end)
    /// into a zero-based offset into `contents`.
    pub fn sass_index(&self, index: &SassNumber) -> Result<usize, ValueError> {
        sass_index_to_offset(index, self.len(), "list")
    }
}

impl<'a> IntoIterator for &'a SassList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.contents.iter()
    }
}
