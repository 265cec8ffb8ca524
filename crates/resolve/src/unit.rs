//! Resolved work units

use serde::Serialize;

use quarry_foundation::Key;

/// One resolved, ready-to-consume binding of a group/variant
/// combination to its concrete backing keys.
///
/// Units are created only by the [`Resolver`](crate::Resolver) and are
/// immutable afterwards. A numeric payload receives the unit together
/// with a key-store handle and retrieves the data itself; the resolver
/// never invokes payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkUnit {
    /// The grouping value shared by all of this unit's keys.
    pub group: String,

    /// Concrete keys satisfying the spec's patterns, primary match
    /// first, then companion matches in pattern order.
    pub primary_keys: Vec<Key>,

    /// Keys attached unconditionally by the spec, `{group}` templates
    /// substituted. Not existence-checked at resolution time; resolved
    /// lazily on first use.
    pub auxiliary_keys: Vec<Key>,

    /// Human-readable label derived from the primary matched key.
    pub label: String,
}

impl WorkUnit {
    /// The primary matched key (first entry of `primary_keys`).
    pub fn primary(&self) -> &Key {
        &self.primary_keys[0]
    }

    /// Every key this unit references, primaries first.
    pub fn all_keys(&self) -> impl Iterator<Item = &Key> {
        self.primary_keys.iter().chain(self.auxiliary_keys.iter())
    }
}
