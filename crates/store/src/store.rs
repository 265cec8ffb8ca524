//! Cached key store
//!
//! Wraps a [`Loader`] with deterministic key enumeration, group
//! derivation, exclusion filtering, and a fetch-once value cache.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, error, trace, warn};

use quarry_foundation::Key;

use crate::error::{Result, StoreError};
use crate::loader::Loader;

/// Compile a filter pattern anchored at the start of the key.
fn anchored(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(&format!("^(?:{pattern})"))?)
}

/// Cached, lazily-populated access to a flat namespace of array keys.
///
/// Construction enumerates the backing keys once, applies the exclusion
/// filter, and sorts the survivors so enumeration is stable across runs.
/// Values are fetched on first access and held in an interior cache as
/// `Arc<L::Value>`, so repeated access never re-reads the backing store
/// and never deep-copies an array.
///
/// The cache is guarded by a mutex: a shared `&KeyStore` can be handed
/// to parallel work-unit payloads, and concurrent first fetches of the
/// same key cannot race (fetch-and-insert happens under the lock).
pub struct KeyStore<L: Loader> {
    loader: L,
    exclude: Vec<Regex>,
    keys: Vec<Key>,
    groups: Vec<String>,
    cache: Mutex<IndexMap<Key, Arc<L::Value>>>,
}

impl<L: Loader> KeyStore<L> {
    /// Build a store over `loader` with no exclusion filter.
    pub fn new(loader: L) -> Result<Self> {
        Self::with_exclude(loader, &[])
    }

    /// Build a store over `loader`, dropping any key matched by one of
    /// the `exclude` patterns (regexes anchored at the key start;
    /// literal key names work as-is).
    pub fn with_exclude(loader: L, exclude: &[&str]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|p| anchored(p))
            .collect::<Result<Vec<_>>>()?;
        let (keys, groups) = enumerate(&loader, &exclude)?;
        Ok(Self {
            loader,
            exclude,
            keys,
            groups,
            cache: Mutex::new(IndexMap::new()),
        })
    }

    /// All available keys, sorted, with exclusions applied.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// All group prefixes, sorted. Root keys contribute no group.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Check if `key` is available.
    pub fn contains(&self, key: &Key) -> bool {
        self.keys.binary_search(key).is_ok()
    }

    /// Get the value for `key`, fetching it on first access.
    pub fn get(&self, key: &Key) -> Result<Arc<L::Value>> {
        if !self.contains(key) {
            return Err(StoreError::KeyNotFound(key.clone()));
        }
        let mut cache = self.cache.lock().expect("key cache mutex poisoned");
        if let Some(value) = cache.get(key) {
            trace!(%key, "cache hit");
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(self.fetch(key)?);
        cache.insert(key.clone(), Arc::clone(&value));
        Ok(value)
    }

    /// Get values for `keys`, in input order.
    ///
    /// Partial cache hits only re-fetch the missing subset. Fails on the
    /// first absent key or fetch failure.
    pub fn get_many(&self, keys: &[Key]) -> Result<Vec<Arc<L::Value>>> {
        for key in keys {
            if !self.contains(key) {
                return Err(StoreError::KeyNotFound(key.clone()));
            }
        }
        let mut cache = self.cache.lock().expect("key cache mutex poisoned");
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = cache.get(key) {
                trace!(%key, "cache hit");
                values.push(Arc::clone(value));
            } else {
                let value = Arc::new(self.fetch(key)?);
                cache.insert(key.clone(), Arc::clone(&value));
                values.push(value);
            }
        }
        Ok(values)
    }

    /// Get every key under `group`, mapped by local name.
    pub fn get_by_group(&self, group: &str) -> Result<IndexMap<String, Arc<L::Value>>> {
        let keys: Vec<Key> = self
            .keys
            .iter()
            .filter(|k| k.in_group(group))
            .cloned()
            .collect();
        let values = self.get_many(&keys)?;
        Ok(keys
            .iter()
            .map(|k| k.name().to_string())
            .zip(values)
            .collect())
    }

    /// Drop every cached value. The only cache invalidation.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().expect("key cache mutex poisoned");
        debug!(entries = cache.len(), "clearing value cache");
        cache.clear();
    }

    /// Re-enumerate keys and groups from the loader and clear the cache.
    ///
    /// For backing stores that can grow while open (a simulation still
    /// writing output).
    pub fn refresh(&mut self) -> Result<()> {
        let (keys, groups) = enumerate(&self.loader, &self.exclude)?;
        self.keys = keys;
        self.groups = groups;
        self.clear_cache();
        Ok(())
    }

    /// Find the keys whose string contains every one of `parts`.
    pub fn find(&self, parts: &[&str]) -> Vec<&Key> {
        self.keys
            .iter()
            .filter(|k| parts.iter().all(|p| k.as_str().contains(p)))
            .collect()
    }

    /// Find the keys matching `pattern` (anchored at the key start).
    pub fn refind(&self, pattern: &str) -> Result<Vec<&Key>> {
        let re = anchored(pattern)?;
        Ok(self
            .keys
            .iter()
            .filter(|k| re.is_match(k.as_str()))
            .collect())
    }

    /// Check that every key in `keys` is available, warning per miss.
    pub fn contains_all(&self, keys: &[Key]) -> bool {
        let mut all = true;
        for key in keys {
            if !self.contains(key) {
                warn!(%key, "key not in store");
                all = false;
            }
        }
        all
    }

    fn fetch(&self, key: &Key) -> Result<L::Value> {
        trace!(%key, "fetching from backing store");
        self.loader.fetch(key).map_err(|source| {
            error!(%key, %source, "failed to fetch key");
            StoreError::Loader {
                key: key.clone(),
                source,
            }
        })
    }
}

fn enumerate<L: Loader>(loader: &L, exclude: &[Regex]) -> Result<(Vec<Key>, Vec<String>)> {
    let mut keys = loader.keys().map_err(|source| {
        error!(%source, "failed to enumerate backing store");
        StoreError::Enumerate(source)
    })?;
    keys.retain(|k| !exclude.iter().any(|re| re.is_match(k.as_str())));
    keys.sort();
    keys.dedup();

    let mut groups: Vec<String> = keys
        .iter()
        .filter_map(|k| k.group())
        .map(str::to_string)
        .collect();
    groups.sort();
    groups.dedup();

    debug!(keys = keys.len(), groups = groups.len(), "enumerated keys");
    Ok((keys, groups))
}
