//! Quarry Foundation
//!
//! Shared value types for the quarry workspace. Currently just [`Key`],
//! the namespaced identifier for one array of simulation output.

mod key;

pub use key::Key;
