//! Store errors

use thiserror::Error;

use quarry_foundation::Key;

/// Store result type
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failure inside a backing [`Loader`](crate::Loader).
///
/// Loaders distinguish a key that is genuinely absent from the backing
/// collection (`Missing`) from an I/O failure while reading it.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("key not in backing store: {0}")]
    Missing(Key),

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Errors surfaced by a [`KeyStore`](crate::KeyStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    KeyNotFound(Key),

    #[error("failed to load key '{key}'")]
    Loader {
        key: Key,
        #[source]
        source: LoaderError,
    },

    #[error("failed to enumerate keys")]
    Enumerate(#[source] LoaderError),

    #[error("invalid filter pattern: {0}")]
    Pattern(#[from] regex::Error),
}
