use crate::{ListSeparator, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// The trailing-argument list a variadic Sass function receives.
///
/// Behaves as a list of the positional arguments, with an attached
/// keyword map. Reading the keywords fires the observer, if any: the
/// compiler needs to know whether a function inspected its keywords to
/// decide whether passing unknown ones is an error.
#[derive(Clone)]
pub struct ArgumentList {
    contents: Arc<[Value]>,
    separator: ListSeparator,
    keywords: Arc<HashMap<String, Value>>,
    observer: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl ArgumentList {
    pub fn new(
        contents: impl IntoIterator<Item = Value>,
        keywords: impl IntoIterator<Item = (String, Value)>,
        separator: ListSeparator,
    ) -> Self {
        ArgumentList {
            contents: contents.into_iter().collect(),
            separator,
            keywords: Arc::new(keywords.into_iter().collect()),
            observer: None,
        }
    }

    /// Attach a keyword observer, replacing any existing one.
    pub fn with_keywords_observer(mut self, observer: impl Fn() + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn contents(&self) -> &[Value] {
        &self.contents
    }

    pub fn separator(&self) -> ListSeparator {
        self.separator
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// The keyword arguments. Every call counts as an observation.
    pub fn keywords(&self) -> &HashMap<String, Value> {
        if let Some(observer) = &self.observer {
            observer();
        }
        &self.keywords
    }

    /// The keyword arguments, without firing the observer. For
    /// machinery (serialization, debugging) that must not count as the
    /// host code reading them.
    pub fn keywords_unobserved(&self) -> &HashMap<String, Value> {
        &self.keywords
    }
}

impl std::fmt::Debug for ArgumentList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Bypass the accessor: debug-printing is not an observation.
        f.debug_struct("ArgumentList")
            .field("contents", &self.contents)
            .field("separator", &self.separator)
            .field("keywords", &*self.keywords)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_keyword_reads_are_observed() {
        let reads = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&reads);

        let list = ArgumentList::new(
            [Value::from(1.0)],
            [("color".to_string(), Value::from("red"))],
            ListSeparator::Comma,
        )
        .with_keywords_observer(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert!(list.keywords().contains_key("color"));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        let _ = list.keywords();
        assert_eq!(reads.load(Ordering::SeqCst), 2);

        // Positional access is not an observation.
        let _ = list.contents();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }
}
