//! Quarry Resolve
//!
//! Discovers coherent units of work inside a flat, dynamically-named
//! key namespace. A [`PatternSpec`] declares the shape of one work-unit
//! kind as named-capture regexes; the [`Resolver`] scans a key store,
//! clusters matches into groups, checks each group's completeness, and
//! emits one [`WorkUnit`] per valid group/variant combination.
//!
//! The resolver never touches the numeric data: it consumes key names
//! and produces bound key lists. Handing a unit and the store to a
//! numeric payload is the caller's job:
//!
//! ```
//! use quarry_resolve::{PatternSpec, Resolver};
//! use quarry_store::{KeyStore, MemLoader};
//!
//! let loader: MemLoader<Vec<f64>> = [
//!     ("flux/ion", vec![1.0, 2.0]),
//!     ("flux/electron", vec![3.0, 4.0]),
//! ]
//! .into_iter()
//! .collect();
//! let store = KeyStore::new(loader)?;
//!
//! let spec = PatternSpec::new([r"^(?P<sect>flux)/(?P<species>ion|electron)$"]);
//! let resolver = Resolver::new(spec)?;
//!
//! for unit in resolver.resolve(&store) {
//!     let values = store.get_many(&unit.primary_keys)?;
//!     // ... numeric payload runs here, keyed by unit.label ...
//!     assert_eq!(values.len(), 1);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod resolver;
pub mod spec;
pub mod unit;

pub use quarry_foundation::Key;
pub use resolver::Resolver;
pub use spec::{Cardinality, Completeness, PatternSpec, SpecError};
pub use unit::WorkUnit;
