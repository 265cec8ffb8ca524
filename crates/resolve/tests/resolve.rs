//! End-to-end resolution over a key store.
//!
//! The fixtures mirror real post-processing namespaces: radial-profile
//! arrays keyed per species and field kind, history arrays completed by
//! a shared time axis, and snapshot groups completed by coordinate
//! axes.

use quarry_resolve::{Completeness, Key, PatternSpec, Resolver, WorkUnit};
use quarry_store::{KeyStore, MemLoader};

fn store(keys: &[&str]) -> KeyStore<MemLoader<f64>> {
    let loader: MemLoader<f64> = keys.iter().map(|&k| (k, 1.0)).collect();
    KeyStore::new(loader).unwrap()
}

fn unit_for<'u>(units: &'u [WorkUnit], primary: &str) -> &'u WorkUnit {
    units
        .iter()
        .find(|u| u.primary() == &Key::from(primary))
        .unwrap_or_else(|| panic!("no unit with primary key {primary}"))
}

/// One key, one unit: each profile array stands alone.
#[test]
fn test_single_cardinality_one_key_per_unit() {
    let store = store(&[
        "da/i-p-f",
        "da/i-m-f",
        "da/e-p-f",
        "da/e-m-f",
        "g/c",
        "his/n",
    ]);
    let spec = PatternSpec::new([r"^(?P<sect>da)/(?P<spc>(?:i|e))-(?P<fld>(?:p|m))-f$"])
        .with_auxiliary(["g/c", "his/n"])
        .with_labeler(r"^da/(?P<spc>i|e)-(?P<fld>p|m)-(?P<suffix>f)$");
    let resolver = Resolver::new(spec).unwrap();

    let units = resolver.resolve(&store);
    assert_eq!(units.len(), 4);

    // Every unit binds exactly one primary key and no two units share one.
    for unit in &units {
        assert_eq!(unit.primary_keys.len(), 1);
    }
    let primaries: std::collections::HashSet<&Key> = units.iter().map(|u| u.primary()).collect();
    assert_eq!(primaries.len(), 4);

    let unit = unit_for(&units, "da/i-p-f");
    assert_eq!(unit.group, "da");
    assert_eq!(unit.primary_keys, ["da/i-p-f"]);
    assert_eq!(unit.auxiliary_keys, ["g/c", "his/n"]);
    assert_eq!(unit.label, "i_p_f");
}

/// A history array is completed by the shared time axis of its group.
#[test]
fn test_multi_cardinality_with_one_companion() {
    let store = store(&["his/i", "his/e", "his/n", "g/c"]);
    let spec = PatternSpec::new([r"^(?P<sect>his)/(?P<spc>(?:i|e))$", r"^(?P<sect>his)/n$"])
        .with_auxiliary(["g/c"])
        .with_labeler(r"^his/(?P<spc>i|e)$");
    let resolver = Resolver::new(spec).unwrap();

    let units = resolver.resolve(&store);
    assert_eq!(units.len(), 2);

    // Enumeration is sorted, so his/e is the first variant seen.
    assert_eq!(units[0].primary_keys, ["his/e", "his/n"]);
    assert_eq!(units[0].label, "e");
    assert_eq!(units[1].primary_keys, ["his/i", "his/n"]);
    assert_eq!(units[1].label, "i");
    for unit in &units {
        assert_eq!(unit.group, "his");
        assert_eq!(unit.auxiliary_keys, ["g/c"]);
    }
}

/// Snapshot fields are completed by both coordinate axes; companion
/// matches are cumulative, not alternatives.
#[test]
fn test_multi_cardinality_with_cumulative_companions() {
    let store = store(&[
        "s0/p", "s0/a", "s0/x", "s0/y", "s2/p", "s2/a", "s2/x", "s2/y", "g/c",
    ]);
    let spec = PatternSpec::new([
        r"^(?P<sect>s\d)/(?P<fld>(?:p|a))$",
        r"^(?P<sect>s\d)/(?:x|y)$",
    ])
    .with_auxiliary(["g/c"])
    .with_labeler(r"^s\d/(?P<fld>p|a)$");
    let resolver = Resolver::new(spec).unwrap();

    let units = resolver.resolve(&store);
    assert_eq!(units.len(), 4);
    for unit in &units {
        assert_eq!(unit.primary_keys.len(), 3);
    }

    // Grouped s0 x2 then s2 x2, in first-appearance order.
    let groups: Vec<&str> = units.iter().map(|u| u.group.as_str()).collect();
    assert_eq!(groups, ["s0", "s0", "s2", "s2"]);

    assert_eq!(units[0].primary_keys, ["s0/a", "s0/x", "s0/y"]);
    assert_eq!(units[0].label, "a");
    assert_eq!(units[1].primary_keys, ["s0/p", "s0/x", "s0/y"]);
    assert_eq!(units[1].label, "p");
    assert_eq!(units[3].primary_keys, ["s2/p", "s2/x", "s2/y"]);
}

/// A group missing a required companion yields nothing; satisfied
/// groups still emit their variants.
#[test]
fn test_incomplete_group_dropped_silently() {
    let store = store(&["s0/p", "s0/x", "s2/p"]);
    let spec = PatternSpec::new([r"^(?P<sect>s\d)/p$", r"^(?P<sect>s\d)/x$"]);
    let resolver = Resolver::new(spec).unwrap();

    let units = resolver.resolve(&store);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].group, "s0");
    assert_eq!(units[0].primary_keys, ["s0/p", "s0/x"]);
}

/// Explicit completeness splits one companion pattern into separately
/// required sub-requirements: `x|y` matching only `x` is not enough.
#[test]
fn test_explicit_completeness_requires_each_axis() {
    let keys = &["s0/p", "s0/x", "s0/y", "s2/p", "s2/x"]; // s2/y missing
    let patterns = [
        r"^(?P<sect>s\d)/(?P<fld>p|a)$",
        r"^(?P<sect>s\d)/(?:x|y)$",
    ];

    // Under ALL, s2 is satisfied: the companion pattern has a match.
    let all = Resolver::new(PatternSpec::new(patterns)).unwrap();
    let units = all.resolve(&store(keys));
    assert_eq!(units.len(), 2);
    assert_eq!(unit_for(&units, "s2/p").primary_keys, ["s2/p", "s2/x"]);

    // Requiring x and y separately drops s2.
    let split = Resolver::new(PatternSpec::new(patterns).with_completeness(
        Completeness::Explicit(vec![r"s\d/x$".to_string(), r"s\d/y$".to_string()]),
    ))
    .unwrap();
    let units = split.resolve(&store(keys));
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].primary_keys, ["s0/p", "s0/x", "s0/y"]);
}

/// Resolution is pure: repeated passes over an unchanged store produce
/// identical units in identical order.
#[test]
fn test_resolution_is_idempotent() {
    let store = store(&["his/i", "his/e", "his/n", "da/i-p-f", "g/c"]);
    let spec = PatternSpec::new([r"^(?P<sect>his)/(?P<spc>(?:i|e))$", r"^(?P<sect>his)/n$"])
        .with_auxiliary(["g/c"]);
    let resolver = Resolver::new(spec).unwrap();

    let first = resolver.resolve(&store);
    let second = resolver.resolve(&store);
    assert_eq!(first, second);
}

/// Literal auxiliary keys are identical across all units of a spec.
#[test]
fn test_literal_auxiliary_shared_across_groups() {
    let store = store(&["s0/p", "s0/x", "s2/p", "s2/x", "g/c", "gtc/tstep"]);
    let spec = PatternSpec::new([r"^(?P<sect>s\d)/p$", r"^(?P<sect>s\d)/x$"])
        .with_auxiliary(["g/c", "gtc/tstep"]);
    let resolver = Resolver::new(spec).unwrap();

    let units = resolver.resolve(&store);
    assert_eq!(units.len(), 2);
    for unit in &units {
        assert_eq!(unit.auxiliary_keys, ["g/c", "gtc/tstep"]);
    }
}

/// Specs are plain configuration data; a spec deserialized from JSON
/// resolves like a hand-built one.
#[test]
fn test_spec_roundtrip_through_json() {
    let spec: PatternSpec = serde_json::from_str(
        r#"{
            "patterns": ["^(?P<sect>his)/(?P<spc>(?:i|e))$", "^(?P<sect>his)/n$"],
            "auxiliary": ["g/c"],
            "labeler": "^his/(?P<spc>i|e)$"
        }"#,
    )
    .unwrap();
    let resolver = Resolver::new(spec).unwrap();

    let units = resolver.resolve(&store(&["his/i", "his/e", "his/n", "g/c"]));
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].label, "e");
}

/// The consumption contract: a payload gets the unit plus the store and
/// retrieves the data itself.
#[test]
fn test_payload_consumes_unit_through_store() {
    let loader: MemLoader<Vec<f64>> = [
        ("his/i", vec![1.0, 2.0]),
        ("his/n", vec![0.0, 1.0]),
        ("g/c", vec![0.5]),
    ]
    .into_iter()
    .collect();
    let store = KeyStore::new(loader).unwrap();

    let spec = PatternSpec::new([r"^(?P<sect>his)/(?P<spc>(?:i|e))$", r"^(?P<sect>his)/n$"])
        .with_auxiliary(["g/c"]);
    let resolver = Resolver::new(spec).unwrap();
    let units = resolver.resolve(&store);
    assert_eq!(units.len(), 1);

    // Trivial payload: count every array the unit binds.
    let wanted: Vec<Key> = units[0].all_keys().cloned().collect();
    let arrays = store.get_many(&wanted).unwrap();
    assert_eq!(arrays.len(), 3);
    assert_eq!(*arrays[0], vec![1.0, 2.0]);
}
