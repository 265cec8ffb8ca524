//! Work-unit pattern specifications
//!
//! A [`PatternSpec`] is a plain data value describing one kind of work
//! unit. Concrete work types are spec values constructed (or
//! deserialized) by the caller, not subclasses or registries.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a work type is defined by one pattern or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// One pattern; each primary match stands alone.
    Single,
    /// Primary plus companions; matches must be completed within the
    /// same group.
    Multi,
}

/// Policy deciding whether a matched group has enough keys to emit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completeness {
    /// Every pattern entry must have at least one match in the group.
    #[default]
    All,
    /// Every listed regex must match at least one of the group's
    /// matched keys. Lets one companion pattern's matches be split into
    /// separately-required sub-requirements (e.g. an `x` key and a `y`
    /// key where one companion regex matches either).
    Explicit(Vec<String>),
}

/// Declarative description of one work-unit shape.
///
/// `patterns[0]` is the primary pattern: it enumerates variants. The
/// remaining entries are companions whose matches must co-occur with a
/// primary match inside the same group.
///
/// Named captures drive the clustering: a capture name appearing in
/// more than one pattern entry is a grouping dimension (its value tuple
/// identifies a cluster); a capture appearing only in the primary is a
/// variant dimension (each distinct value yields a separate unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Ordered, non-empty list of named-capture regexes, anchored at
    /// the key start when matched.
    pub patterns: Vec<String>,

    /// Completeness requirement for each group.
    #[serde(default)]
    pub completeness: Completeness,

    /// Keys attached to every emitted unit unconditionally. Entries may
    /// contain the `{group}` placeholder; they are never
    /// existence-checked at resolution time.
    #[serde(default)]
    pub auxiliary: Vec<String>,

    /// Regex applied to the primary matched key to derive the unit
    /// label; its named captures are joined with `label_sep`. When
    /// absent, the label is the first named capture of the primary
    /// pattern. A labeler that fails to match labels the unit `"null"`.
    #[serde(default)]
    pub labeler: Option<String>,

    /// Separator used when joining labeler captures.
    #[serde(default = "default_label_sep")]
    pub label_sep: String,
}

fn default_label_sep() -> String {
    "_".to_string()
}

impl PatternSpec {
    /// Create a spec with the given patterns and default everything else.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            completeness: Completeness::All,
            auxiliary: Vec::new(),
            labeler: None,
            label_sep: default_label_sep(),
        }
    }

    /// Replace the completeness requirement.
    pub fn with_completeness(mut self, completeness: Completeness) -> Self {
        self.completeness = completeness;
        self
    }

    /// Attach auxiliary key names or `{group}` templates.
    pub fn with_auxiliary<I, S>(mut self, auxiliary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auxiliary = auxiliary.into_iter().map(Into::into).collect();
        self
    }

    /// Set the labeler regex.
    pub fn with_labeler(mut self, labeler: impl Into<String>) -> Self {
        self.labeler = Some(labeler.into());
        self
    }

    /// Set the label join separator.
    pub fn with_label_sep(mut self, sep: impl Into<String>) -> Self {
        self.label_sep = sep.into();
        self
    }

    /// Cardinality is derived from the pattern count, never stored.
    pub fn cardinality(&self) -> Cardinality {
        if self.patterns.len() <= 1 {
            Cardinality::Single
        } else {
            Cardinality::Multi
        }
    }
}

/// A malformed spec, rejected at [`Resolver`](crate::Resolver)
/// construction time, before any matching occurs.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("pattern list must not be empty")]
    EmptyPatterns,

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_derived_from_pattern_count() {
        let single = PatternSpec::new([r"^his/(?P<spc>i|e)$"]);
        assert_eq!(single.cardinality(), Cardinality::Single);

        let multi = PatternSpec::new([r"^(?P<sect>his)/(?P<spc>i|e)$", r"^(?P<sect>his)/n$"]);
        assert_eq!(multi.cardinality(), Cardinality::Multi);
    }

    #[test]
    fn test_builder_chain() {
        let spec = PatternSpec::new([r"^s\d/p$"])
            .with_completeness(Completeness::Explicit(vec![r"s\d/x$".to_string()]))
            .with_auxiliary(["gtc/tstep"])
            .with_labeler(r"^(?P<sect>s\d)/p$")
            .with_label_sep("-");
        assert_eq!(spec.auxiliary, ["gtc/tstep"]);
        assert_eq!(spec.label_sep, "-");
        assert!(matches!(spec.completeness, Completeness::Explicit(_)));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let spec: PatternSpec = serde_json::from_str(
            r#"{ "patterns": ["^(?P<sect>da)/(?P<spc>i|e)-f$"] }"#,
        )
        .unwrap();
        assert_eq!(spec.completeness, Completeness::All);
        assert!(spec.auxiliary.is_empty());
        assert!(spec.labeler.is_none());
        assert_eq!(spec.label_sep, "_");
        assert_eq!(spec.cardinality(), Cardinality::Single);
    }

    #[test]
    fn test_deserialize_explicit_completeness() {
        let spec: PatternSpec = serde_json::from_str(
            r#"{
                "patterns": ["^(?P<sect>s\\d)/(?P<fld>p|a)$", "^(?P<sect>s\\d)/(?:x|y)$"],
                "completeness": { "Explicit": ["s\\d/x$", "s\\d/y$"] },
                "auxiliary": ["gtc/tstep", "{group}/time"]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.cardinality(), Cardinality::Multi);
        assert_eq!(spec.auxiliary.len(), 2);
        match &spec.completeness {
            Completeness::Explicit(needed) => assert_eq!(needed.len(), 2),
            other => panic!("expected explicit completeness, got {other:?}"),
        }
    }
}
