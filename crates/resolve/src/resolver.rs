//! Work-unit resolution
//!
//! Matches a [`PatternSpec`] against a key namespace and emits one
//! [`WorkUnit`] per valid group/variant combination.
//!
//! # What this pass does
//!
//! 1. **Primary scan** - matches every key against `patterns[0]` and
//!    clusters the matches by their grouping-capture values
//! 2. **Companion scan** - per cluster, collects the keys matching each
//!    companion pattern inside the same group
//! 3. **Completeness check** - drops clusters that fail the spec's
//!    completeness requirement (silently; absent data is routine)
//! 4. **Emission** - binds each surviving primary match to its
//!    companions, auxiliary keys, and a derived label
//!
//! # What this pass does NOT do
//!
//! - **No data retrieval** - resolution is a pure computation over key
//!   names; cost is O(|keys| x |patterns|) regex evaluations
//! - **No payload dispatch** - the caller hands units to its numeric
//!   payloads; the resolver never invokes them
//! - **No shape or unit validation** - the numbers are opaque here

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use tracing::{debug, trace};

use quarry_foundation::Key;
use quarry_store::{KeyStore, Loader};

use crate::spec::{Cardinality, Completeness, PatternSpec, SpecError};
use crate::unit::WorkUnit;

/// Label used when the labeler regex does not match the primary key.
const NULL_LABEL: &str = "null";

/// Compile a spec pattern anchored at the key start.
fn compile(pattern: &str) -> Result<Regex, SpecError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| SpecError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// A compiled [`PatternSpec`], ready to scan key namespaces.
///
/// Construction compiles every regex up front, so a malformed spec
/// fails fast, before any matching occurs. Resolution itself is pure
/// and cannot fail.
pub struct Resolver {
    spec: PatternSpec,
    patterns: Vec<Regex>,
    /// Compiled `Completeness::Explicit` entries; empty for `All`.
    needed: Vec<Regex>,
    labeler: Option<Regex>,
    /// Capture names shared between the primary and any companion.
    /// Their value tuple identifies a cluster.
    grouping: Vec<String>,
}

impl Resolver {
    pub fn new(spec: PatternSpec) -> Result<Self, SpecError> {
        if spec.patterns.is_empty() {
            return Err(SpecError::EmptyPatterns);
        }
        let patterns = spec
            .patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        let needed = match &spec.completeness {
            Completeness::All => Vec::new(),
            Completeness::Explicit(list) => list
                .iter()
                .map(|p| compile(p))
                .collect::<Result<Vec<_>, _>>()?,
        };
        let labeler = spec.labeler.as_deref().map(compile).transpose()?;
        let grouping = grouping_captures(&patterns);
        Ok(Self {
            spec,
            patterns,
            needed,
            labeler,
            grouping,
        })
    }

    /// The spec this resolver was built from.
    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    pub fn cardinality(&self) -> Cardinality {
        self.spec.cardinality()
    }

    /// Resolve against a key store's enumerated namespace.
    pub fn resolve<L: Loader>(&self, store: &KeyStore<L>) -> Vec<WorkUnit> {
        self.resolve_keys(store.keys())
    }

    /// Resolve against a bare key list.
    ///
    /// Output order is stable: clusters in the order their first
    /// primary match appears in `keys`, units within a cluster in
    /// primary-match order. Duplicate keys are ignored.
    pub fn resolve_keys(&self, keys: &[Key]) -> Vec<WorkUnit> {
        let primary = &self.patterns[0];

        // Primary scan: cluster matches by grouping-capture values.
        // With no grouping dimension (single-pattern specs, mostly) the
        // key's group prefix stands in as the cluster identity.
        let mut clusters: IndexMap<Vec<String>, IndexSet<&Key>> = IndexMap::new();
        for key in keys {
            let Some(caps) = primary.captures(key.as_str()) else {
                continue;
            };
            let id: Vec<String> = if self.grouping.is_empty() {
                vec![key.group().unwrap_or("").to_string()]
            } else {
                self.grouping
                    .iter()
                    .map(|name| {
                        caps.name(name)
                            .map(|m| m.as_str().to_string())
                            .unwrap_or_default()
                    })
                    .collect()
            };
            trace!(%key, group = %id.join("/"), "primary match");
            clusters.entry(id).or_default().insert(key);
        }
        debug!(
            clusters = clusters.len(),
            matches = clusters.values().map(IndexSet::len).sum::<usize>(),
            "primary scan complete"
        );

        let mut units = Vec::new();
        for (id, primaries) in &clusters {
            let group = id.join("/");
            let companions = match self.cardinality() {
                Cardinality::Single => Vec::new(),
                Cardinality::Multi => match self.companions_for(keys, id, primaries) {
                    Some(sets) => sets,
                    None => {
                        debug!(group = %group, "group incomplete, dropped");
                        continue;
                    }
                },
            };
            for &key in primaries {
                units.push(self.emit(key, &group, &companions));
            }
        }
        debug!(units = units.len(), "resolution complete");
        units
    }

    /// Collect each companion pattern's matches inside one cluster and
    /// evaluate the completeness requirement. `None` drops the cluster.
    fn companions_for<'k>(
        &self,
        keys: &'k [Key],
        id: &[String],
        primaries: &IndexSet<&'k Key>,
    ) -> Option<Vec<Vec<&'k Key>>> {
        let mut sets = Vec::with_capacity(self.patterns.len() - 1);
        for re in &self.patterns[1..] {
            // Companion matches carry no variant dimension: all matches
            // within the group are retained, cumulatively.
            let mut found: Vec<&Key> = keys
                .iter()
                .filter(|k| self.companion_matches(re, k, id))
                .collect();
            found.sort();
            found.dedup();
            sets.push(found);
        }

        let satisfied = match &self.spec.completeness {
            Completeness::All => sets.iter().all(|s| !s.is_empty()),
            Completeness::Explicit(_) => {
                let matched: IndexSet<&Key> = primaries
                    .iter()
                    .copied()
                    .chain(sets.iter().flatten().copied())
                    .collect();
                self.needed
                    .iter()
                    .all(|re| matched.iter().any(|k| re.is_match(k.as_str())))
            }
        };
        satisfied.then_some(sets)
    }

    /// Check one key against a companion pattern within a cluster: the
    /// key must match, and every grouping capture the companion carries
    /// must equal the cluster's value.
    fn companion_matches(&self, re: &Regex, key: &Key, id: &[String]) -> bool {
        let Some(caps) = re.captures(key.as_str()) else {
            return false;
        };
        if self.grouping.is_empty() {
            return key.group().unwrap_or("") == id[0];
        }
        self.grouping
            .iter()
            .zip(id)
            .all(|(name, want)| match caps.name(name) {
                Some(m) => m.as_str() == want,
                None => true,
            })
    }

    fn emit(&self, primary: &Key, group: &str, companions: &[Vec<&Key>]) -> WorkUnit {
        let mut primary_keys = vec![primary.clone()];
        let mut seen: IndexSet<&Key> = IndexSet::new();
        seen.insert(primary);
        for set in companions {
            for &key in set {
                if seen.insert(key) {
                    primary_keys.push(key.clone());
                }
            }
        }
        WorkUnit {
            group: group.to_string(),
            primary_keys,
            auxiliary_keys: self.auxiliary_for(group),
            label: self.label_for(primary),
        }
    }

    fn auxiliary_for(&self, group: &str) -> Vec<Key> {
        self.spec
            .auxiliary
            .iter()
            .map(|template| Key::new(template.replace("{group}", group)))
            .collect()
    }

    /// Derive the unit label from the primary matched key.
    ///
    /// With a labeler regex, its named captures (in pattern order) are
    /// joined with the spec's separator. Without one, the label is the
    /// first named capture of the primary pattern. Either way a miss
    /// falls back to `"null"`.
    fn label_for(&self, key: &Key) -> String {
        let re = self.labeler.as_ref().unwrap_or(&self.patterns[0]);
        let Some(caps) = re.captures(key.as_str()) else {
            return NULL_LABEL.to_string();
        };
        let mut parts = re
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| m.as_str()));
        match &self.labeler {
            Some(_) => {
                let parts: Vec<&str> = parts.collect();
                if parts.is_empty() {
                    NULL_LABEL.to_string()
                } else {
                    parts.join(&self.spec.label_sep)
                }
            }
            None => parts
                .next()
                .map(str::to_string)
                .unwrap_or_else(|| NULL_LABEL.to_string()),
        }
    }
}

/// Capture names appearing in the primary pattern and at least one
/// companion, in primary-pattern order.
fn grouping_captures(patterns: &[Regex]) -> Vec<String> {
    patterns[0]
        .capture_names()
        .flatten()
        .filter(|name| {
            patterns[1..]
                .iter()
                .any(|re| re.capture_names().flatten().any(|n| n == *name))
        })
        .map(str::to_string)
        .collect()
}
