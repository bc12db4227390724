//! Integration test: lookup invariants over many keys and ring shapes.

use std::collections::HashSet;

use continuum_integration_tests::{SAMPLE_KEYS, node_names, random_keys, ring_of};
use continuum_ring::{HashFunction, Ring, RingError};

fn rings() -> Vec<Ring> {
    let mut rings = Vec::new();
    for function in [HashFunction::Md5, HashFunction::Sha1, HashFunction::Blake3] {
        for (replicas, members) in [(1, 1), (1, 7), (8, 3), (64, 5), (160, 12)] {
            let names = node_names(members);
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            rings.push(ring_of(replicas, function, &names));
        }
    }
    rings
}

/// Every result is distinct and has length `min(count, members)`.
#[test]
fn test_find_nodes_distinct_and_bounded() {
    let keys = random_keys(1, 500);
    for ring in rings() {
        for key in &keys {
            for count in [1, 2, 3, 5, 13, 100] {
                let nodes = ring.find_nodes(key, count).unwrap();
                assert_eq!(nodes.len(), count.min(ring.node_count()));
                let unique: HashSet<_> = nodes.iter().collect();
                assert_eq!(unique.len(), nodes.len(), "duplicate node in {nodes:?}");
                assert!(nodes.iter().all(|n| ring.contains(n)));
            }
        }
    }
}

/// `find_nodes(key, 1)` always agrees with `find_node(key)`.
#[test]
fn test_find_nodes_head_is_find_node() {
    let keys = random_keys(2, 1000);
    for ring in rings() {
        for key in &keys {
            let primary = ring.find_node(key).unwrap();
            assert_eq!(ring.find_nodes(key, 1).unwrap(), [primary.clone()]);
            assert_eq!(ring.find_nodes(key, 4).unwrap()[0], primary);
        }
    }
}

/// Larger replica sets extend smaller ones.
#[test]
fn test_find_nodes_prefix_stable() {
    let keys = random_keys(3, 500);
    let ring = ring_of(64, HashFunction::Md5, &["a", "b", "c", "d", "e", "f"]);
    for key in &keys {
        let all = ring.find_nodes(key, 6).unwrap();
        for count in 1..=6 {
            assert_eq!(ring.find_nodes(key, count).unwrap(), all[..count]);
        }
    }
}

/// Repeated lookups on an unchanged ring return identical answers.
#[test]
fn test_lookups_repeatable() {
    let keys = random_keys(4, 500);
    let ring = ring_of(32, HashFunction::Sha1, &["a", "b", "c", "d"]);
    for key in &keys {
        assert_eq!(ring.find_nodes(key, 3).unwrap(), ring.find_nodes(key, 3).unwrap());
    }
}

/// Final placement depends only on membership, not on the order of adds.
#[test]
fn test_add_order_independent() {
    let names = node_names(8);
    let forward: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut backward = forward.clone();
    backward.reverse();
    let mut interleaved: Vec<&str> = forward.iter().step_by(2).copied().collect();
    interleaved.extend(forward.iter().skip(1).step_by(2));

    for function in [HashFunction::Md5, HashFunction::Sha1, HashFunction::Blake3] {
        let a = ring_of(100, function, &forward);
        let b = ring_of(100, function, &backward);
        let c = ring_of(100, function, &interleaved);

        assert!(a.points().eq(b.points()));
        assert!(a.points().eq(c.points()));
        for key in random_keys(5, 1000) {
            let want = a.find_nodes(&key, 3).unwrap();
            assert_eq!(b.find_nodes(&key, 3).unwrap(), want);
            assert_eq!(c.find_nodes(&key, 3).unwrap(), want);
        }
    }
}

/// Removing a member purges all of its points and nothing else.
#[test]
fn test_remove_purges_points() {
    let mut ring = ring_of(50, HashFunction::Md5, &["a", "b", "c"]);
    let survivors: Vec<_> = ring.points().filter(|p| p.node != "b").cloned().collect();

    ring.remove("b").unwrap();

    let remaining: Vec<_> = ring.points().cloned().collect();
    assert_eq!(remaining, survivors);
    assert_eq!(ring.point_count(), 100);
}

/// Each member contributes exactly `replicas` points absent collisions.
#[test]
fn test_point_count_matches_members() {
    for ring in rings() {
        let placed: u32 = ring
            .members()
            .iter()
            .map(|n| ring.node_info(n).unwrap().points)
            .sum();
        assert_eq!(placed as usize, ring.point_count());
        assert_eq!(ring.point_count(), ring.node_count() * ring.replicas() as usize);
    }
}

/// Spread is within a loose band of even for a well-populated ring.
#[test]
fn test_keys_spread_evenly() {
    let ring = ring_of(160, HashFunction::Md5, &["a", "b", "c", "d"]);
    let mut served = [0usize; 4];
    for key in random_keys(6, SAMPLE_KEYS) {
        let node = ring.find_node(&key).unwrap();
        served[(node.as_bytes()[0] - b'a') as usize] += 1;
    }
    for (i, n) in served.iter().enumerate() {
        let share = *n as f64 / SAMPLE_KEYS as f64;
        assert!(
            (0.15..=0.35).contains(&share),
            "member {i} serves {share:.3} of keys"
        );
    }
}

#[test]
fn test_empty_ring_errors() {
    let mut ring = ring_of(8, HashFunction::Md5, &[]);
    assert_eq!(ring.find_node("key"), Err(RingError::EmptyRing));
    assert_eq!(ring.find_nodes("key", 1), Err(RingError::EmptyRing));

    ring.add("only").unwrap();
    assert_eq!(ring.find_node("key").unwrap(), "only");
    ring.remove("only").unwrap();
    assert_eq!(ring.find_node("key"), Err(RingError::EmptyRing));
}
