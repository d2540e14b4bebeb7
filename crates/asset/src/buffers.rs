//! Buffer Set: every dropped or extracted file, keyed by normalized path.

use bytes::Bytes;
use indexmap::IndexMap;

use crate::paths;

/// Insertion-ordered mapping from normalized relative path to file content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BufferSet {
    entries: IndexMap<String, Bytes>,
}

impl BufferSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert content under the normalized form of `path`.
    /// An existing key keeps its position and gets the new content.
    pub fn insert(&mut self, path: &str, data: impl Into<Bytes>) -> Option<Bytes> {
        self.entries.insert(paths::normalize(path), data.into())
    }

    pub fn get(&self, path: &str) -> Option<&Bytes> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Remove a key, keeping the order of the remaining ones.
    pub fn remove(&mut self, path: &str) -> Option<Bytes> {
        self.entries.shift_remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bytes)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(Bytes::len).sum()
    }
}

impl<K: AsRef<str>, V: Into<Bytes>> FromIterator<(K, V)> for BufferSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (path, data) in iter {
            set.insert(path.as_ref(), data);
        }
        set
    }
}
