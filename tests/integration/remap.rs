//! Integration test: bounded remapping under membership changes.
//!
//! Adding or removing one member out of `n` should move roughly `1/n` of the
//! keys, and only keys that touch the changed member.

use continuum_integration_tests::{SAMPLE_KEYS, node_names, random_keys, ring_of};
use continuum_ring::{HashFunction, Ring};

fn members(n: usize) -> Vec<String> {
    node_names(n)
}

fn build(function: HashFunction, names: &[String]) -> Ring {
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    ring_of(160, function, &names)
}

/// Join a fifth member: about 1/5 of keys move, all of them onto the new node.
#[test]
fn test_join_moves_about_one_share() {
    let keys = random_keys(10, SAMPLE_KEYS);
    for function in [HashFunction::Md5, HashFunction::Sha1, HashFunction::Blake3] {
        let old = build(function, &members(4));
        let mut new = old.clone();
        new.add("node-04").unwrap();

        let moved = Ring::diff(&old, &new, &keys).unwrap();
        let fraction = moved.len() as f64 / keys.len() as f64;
        assert!(
            (0.1..=0.3).contains(&fraction),
            "{function}: {fraction:.3} of keys moved on join"
        );
        assert!(moved.iter().all(|m| m.to == "node-04"));
    }
}

/// Leave one of five members: about 1/5 of keys move, all of them off it.
#[test]
fn test_leave_moves_about_one_share() {
    let keys = random_keys(11, SAMPLE_KEYS);
    for function in [HashFunction::Md5, HashFunction::Sha1, HashFunction::Blake3] {
        let old = build(function, &members(5));
        let mut new = old.clone();
        new.remove("node-02").unwrap();

        let moved = Ring::diff(&old, &new, &keys).unwrap();
        let fraction = moved.len() as f64 / keys.len() as f64;
        assert!(
            (0.1..=0.3).contains(&fraction),
            "{function}: {fraction:.3} of keys moved on leave"
        );
        assert!(moved.iter().all(|m| m.from == "node-02"));
    }
}

/// Replica sets only change where the changed member appears.
#[test]
fn test_replica_sets_change_only_around_new_member() {
    let keys = random_keys(12, 2000);
    let old = build(HashFunction::Md5, &members(6));
    let mut new = old.clone();
    new.add("node-06").unwrap();

    for key in &keys {
        let before = old.find_nodes(key, 3).unwrap();
        let after = new.find_nodes(key, 3).unwrap();
        if !after.iter().any(|n| *n == "node-06") {
            assert_eq!(before, after);
        } else {
            // The new node displaces at most one old member; the rest keep
            // their relative order.
            let kept: Vec<_> = after.iter().filter(|n| **n != "node-06").cloned().collect();
            assert_eq!(kept[..], before[..kept.len()]);
        }
    }
}

/// A join followed by the matching leave restores every lookup.
#[test]
fn test_join_then_leave_is_identity() {
    let keys = random_keys(13, 2000);
    let old = build(HashFunction::Sha1, &members(3));
    let mut ring = old.clone();
    ring.add("transient").unwrap();
    ring.remove("transient").unwrap();
    assert!(Ring::diff(&old, &ring, &keys).unwrap().is_empty());
}
