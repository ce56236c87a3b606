use crate::Value;
use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::Arc;

/// An immutable SassScript map. Keys use the value tree's own equality,
/// so `1in` and `2.54cm` are the same key. Iteration order is not
/// specified.
#[derive(Debug, Clone, Default)]
pub struct SassMap {
    entries: Arc<HashMap<Value, Value>>,
}

impl SassMap {
    /// Build a map from entries. A key given more than once keeps its
    /// last value.
    pub fn new(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        SassMap {
            entries: Arc::new(entries.into_iter().collect()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }
}

impl From<HashMap<Value, Value>> for SassMap {
    fn from(entries: HashMap<Value, Value>) -> Self {
        SassMap {
            entries: Arc::new(entries),
        }
    }
}

impl PartialEq for SassMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for SassMap {}

// Order-independent combination of per-entry hashes, so that equal maps
// hash equal regardless of bucket order.
pub(crate) fn unordered_hash<H, I>(state: &mut H, items: I)
where
    H: std::hash::Hasher,
    I: Iterator,
    I::Item: std::hash::Hash,
{
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hash;

    let mut combined: u64 = 0;
    let mut count: u64 = 0;
    for item in items {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        combined ^= hasher.finish();
        count += 1;
    }
    combined.hash(state);
    count.hash(state);
}
