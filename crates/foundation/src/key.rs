//! Key representation for namespaced array data
//!
//! Keys are slash-separated identifiers used throughout the workspace:
//! - `data1d/i-particle-flux`
//! - `history/fieldtime-phi`
//! - `gtc/tstep` (the last segment is the local name, the rest the group)
//!
//! A key without a separator is a root key: it belongs to no group.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A namespaced identifier for one array of data.
///
/// Keys are immutable and support efficient comparison and hashing.
/// Enumeration order is the string order, so sorting a key list is
/// deterministic across runs.
///
/// # Examples
///
/// ```
/// # use quarry_foundation::Key;
/// let key = Key::from("data1d/i-particle-flux");
/// assert_eq!(key.group(), Some("data1d"));
/// assert_eq!(key.name(), "i-particle-flux");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Create a key from anything string-like.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The full key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The group prefix: everything up to the last `/`.
    ///
    /// Returns None for root keys (no separator).
    pub fn group(&self) -> Option<&str> {
        self.0.rfind('/').map(|idx| &self.0[..idx])
    }

    /// The local name: everything after the last `/`, or the whole
    /// key for root keys.
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Check if this key lives directly under `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.group() == Some(group)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for Key {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}
