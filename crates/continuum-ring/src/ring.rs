//! Consistent hashing ring implementation.

use std::collections::{BTreeSet, HashMap};

use continuum_types::{HashFunction, HashMode, NodeName, RingConfig};
use tracing::debug;

use crate::error::RingError;
use crate::hash::RingHasher;

/// A single placement of a node on the ring.
///
/// Points order by position first and node name second, so two nodes that
/// land on the same position are visited in ascending name order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualPoint {
    /// Location on the `u64` ring.
    pub position: u64,
    /// The member this point belongs to.
    pub node: NodeName,
}

/// Metadata about a member of the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Distinct points placed for this node.
    ///
    /// Equal to the ring's replica count unless two of the node's own replica
    /// indices hashed to the same position, in which case only one point is
    /// kept for that position.
    pub points: u32,
}

/// A key whose primary node differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment<'k> {
    /// The key that moved.
    pub key: &'k [u8],
    /// Primary node in the old ring.
    pub from: NodeName,
    /// Primary node in the new ring.
    pub to: NodeName,
}

/// Consistent hashing ring.
///
/// Each member is placed at `replicas` positions on a `u64` ring. A key is
/// served by the first point at or after the key's own position, wrapping
/// past the highest point back to the lowest.
///
/// The ring has no interior mutability; share it across threads through
/// [`SharedRing`](crate::SharedRing) or another lock.
#[derive(Debug, Clone)]
pub struct Ring {
    /// All virtual points, ascending by `(position, node)`.
    continuum: BTreeSet<VirtualPoint>,
    /// Current members.
    nodes: HashMap<NodeName, NodeInfo>,
    /// Points generated per member.
    replicas: u32,
    hasher: RingHasher,
}

impl Ring {
    /// Create an empty ring with 64-bit positions.
    ///
    /// Fails with [`RingError::InvalidConfig`] if `replicas` is zero.
    pub fn new(replicas: u32, function: HashFunction) -> Result<Self, RingError> {
        Self::build(replicas, RingHasher::new(function, HashMode::Normal)?)
    }

    /// Create an empty ring from a full configuration.
    pub fn with_config(config: &RingConfig) -> Result<Self, RingError> {
        Self::build(config.replicas, RingHasher::new(config.hash, config.mode)?)
    }

    fn build(replicas: u32, hasher: RingHasher) -> Result<Self, RingError> {
        if replicas == 0 {
            return Err(RingError::InvalidConfig(
                "replicas must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            continuum: BTreeSet::new(),
            nodes: HashMap::new(),
            replicas,
            hasher,
        })
    }

    /// Add a node to the ring.
    ///
    /// Fails with [`RingError::EmptyName`] for an empty name and
    /// [`RingError::AlreadyExists`] if the node is already a member; the ring
    /// is left untouched in both cases.
    pub fn add(&mut self, node: impl Into<NodeName>) -> Result<(), RingError> {
        let node = node.into();
        if node.is_empty() {
            return Err(RingError::EmptyName);
        }
        if self.nodes.contains_key(&node) {
            return Err(RingError::AlreadyExists(node));
        }

        let positions: Vec<u64> = (0..self.replicas)
            .map(|i| self.hasher.point_position(&node, i))
            .collect();
        let points = self.place(&node, positions);

        debug!(%node, points, replicas = self.replicas, "added node to ring");
        self.nodes.insert(node, NodeInfo { points });
        Ok(())
    }

    /// Insert one point per position, returning how many distinct points were
    /// placed.
    fn place(&mut self, node: &NodeName, positions: impl IntoIterator<Item = u64>) -> u32 {
        let mut placed = 0;
        for position in positions {
            let point = VirtualPoint {
                position,
                node: node.clone(),
            };
            if self.continuum.insert(point) {
                placed += 1;
            }
        }
        placed
    }

    /// Remove a node and all of its points from the ring.
    ///
    /// Fails with [`RingError::NotFound`] if the node is not a member.
    pub fn remove(&mut self, node: impl AsRef<[u8]>) -> Result<(), RingError> {
        let Some((node, _)) = self.nodes.remove_entry(node.as_ref()) else {
            return Err(RingError::NotFound(NodeName::new(node)));
        };

        for i in 0..self.replicas {
            let point = VirtualPoint {
                position: self.hasher.point_position(&node, i),
                node: node.clone(),
            };
            self.continuum.remove(&point);
        }
        debug!(%node, "removed node from ring");
        Ok(())
    }

    /// Find the node responsible for `key`.
    pub fn find_node(&self, key: impl AsRef<[u8]>) -> Result<NodeName, RingError> {
        let position = self.hasher.key_position(key.as_ref());
        self.point_at_or_after(position)
            .map(|point| point.node.clone())
    }

    /// Find up to `count` distinct nodes for `key`, in ring order.
    ///
    /// Walks clockwise from the key's position, skipping nodes already
    /// collected. The first element always equals [`find_node`](Self::find_node).
    /// If fewer than `count` members exist, every member is returned.
    pub fn find_nodes(
        &self,
        key: impl AsRef<[u8]>,
        count: usize,
    ) -> Result<Vec<NodeName>, RingError> {
        if count == 0 {
            return Err(RingError::ZeroCount);
        }
        if self.continuum.is_empty() {
            return Err(RingError::EmptyRing);
        }

        let position = self.hasher.key_position(key.as_ref());
        let max_distinct = count.min(self.nodes.len());
        let mut found = Vec::with_capacity(max_distinct);

        for point in self.walk_from(position) {
            if !found.contains(&point.node) {
                found.push(point.node.clone());
                if found.len() == max_distinct {
                    break;
                }
            }
        }

        Ok(found)
    }

    /// Return the first point at or after `position`, wrapping to the lowest
    /// point when `position` is past the end of the ring.
    pub fn point_at_or_after(&self, position: u64) -> Result<&VirtualPoint, RingError> {
        self.walk_from(position).next().ok_or(RingError::EmptyRing)
    }

    /// Every point in ring order, starting at the first point whose position
    /// is at least `position`.
    fn walk_from(&self, position: u64) -> impl Iterator<Item = &VirtualPoint> {
        // An empty name sorts before every member name at the same position.
        let probe = VirtualPoint {
            position,
            node: NodeName::default(),
        };
        let after = self.continuum.range(&probe..);
        let before = self.continuum.range(..&probe);
        after.chain(before)
    }

    /// Compute which keys change primary node between two ring states.
    pub fn diff<'k, K: AsRef<[u8]>>(
        old: &Ring,
        new: &Ring,
        keys: &'k [K],
    ) -> Result<Vec<Reassignment<'k>>, RingError> {
        let mut moved = Vec::new();
        for key in keys {
            let key = key.as_ref();
            let from = old.find_node(key)?;
            let to = new.find_node(key)?;
            if from != to {
                moved.push(Reassignment { key, from, to });
            }
        }
        Ok(moved)
    }

    /// Whether `node` is a member.
    pub fn contains(&self, node: impl AsRef<[u8]>) -> bool {
        self.nodes.contains_key(node.as_ref())
    }

    /// All member names, in no particular order.
    pub fn members(&self) -> Vec<NodeName> {
        self.nodes.keys().cloned().collect()
    }

    /// Return info about a specific member, if present.
    pub fn node_info(&self, node: impl AsRef<[u8]>) -> Option<&NodeInfo> {
        self.nodes.get(node.as_ref())
    }

    /// Number of members.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of points on the ring.
    pub fn point_count(&self) -> usize {
        self.continuum.len()
    }

    /// Whether the ring has no members.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Points generated per member.
    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    /// The hasher used for placement and lookup.
    pub fn hasher(&self) -> &RingHasher {
        &self.hasher
    }

    /// All points in ascending ring order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &VirtualPoint> {
        self.continuum.iter()
    }
}
