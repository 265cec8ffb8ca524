//! Backing-store contract
//!
//! A loader is whatever actually holds the arrays: an archive reader, a
//! directory scanner, or an in-memory map for tests. The store crate only
//! assumes it can enumerate keys and fetch one value at a time.

use quarry_foundation::Key;

use crate::error::LoaderError;

/// A key-value producer backing a [`KeyStore`](crate::KeyStore).
///
/// `fetch` may open and close an underlying resource (an archive member,
/// a file handle). Implementations must release that resource on every
/// exit path, including fetch failure; RAII guards make this automatic.
///
/// The store never caches on the loader's behalf, so `fetch` is allowed
/// to be expensive: the [`KeyStore`](crate::KeyStore) guarantees it is
/// called at most once per key between cache clears.
pub trait Loader {
    /// The array-like value type this loader produces.
    type Value;

    /// Enumerate every key available in the backing collection.
    ///
    /// Order does not matter; the store sorts for determinism.
    fn keys(&self) -> Result<Vec<Key>, LoaderError>;

    /// Fetch the value for one key.
    ///
    /// Must return [`LoaderError::Missing`] for keys the backing
    /// collection does not hold.
    fn fetch(&self, key: &Key) -> Result<Self::Value, LoaderError>;
}
