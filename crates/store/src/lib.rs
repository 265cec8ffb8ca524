//! Quarry Store
//!
//! Uniform, cached access to a flat namespace of array-valued keys,
//! regardless of backing storage. The backing collaborator implements
//! [`Loader`]; [`KeyStore`] layers key enumeration, group derivation,
//! exclusion filtering, and a fetch-once cache on top of it.

pub mod error;
pub mod loader;
pub mod mem;
pub mod store;

pub use error::{LoaderError, Result, StoreError};
pub use loader::Loader;
pub use mem::MemLoader;
pub use store::KeyStore;
