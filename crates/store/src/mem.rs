//! In-memory loader
//!
//! Backs a [`KeyStore`](crate::KeyStore) with a plain map. Used by tests
//! throughout the workspace and handy for small ad hoc datasets.

use indexmap::IndexMap;

use quarry_foundation::Key;

use crate::error::LoaderError;
use crate::loader::Loader;

/// A [`Loader`] over an in-memory map.
///
/// Values are cloned out on fetch; the store wraps them in `Arc` so each
/// clone happens at most once per cache fill.
#[derive(Debug, Clone, Default)]
pub struct MemLoader<V> {
    entries: IndexMap<Key, V>,
}

impl<V> MemLoader<V> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert a key/value pair, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<Key>, value: V) {
        self.entries.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<Key>, V> FromIterator<(K, V)> for MemLoader<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<V: Clone> Loader for MemLoader<V> {
    type Value = V;

    fn keys(&self) -> Result<Vec<Key>, LoaderError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn fetch(&self, key: &Key) -> Result<V, LoaderError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| LoaderError::Missing(key.clone()))
    }
}
