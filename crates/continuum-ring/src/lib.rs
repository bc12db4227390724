//! Consistent hashing ring with virtual nodes.
//!
//! This crate maps an unbounded key space onto a small, changing set of named
//! nodes. Adding or removing a node only remaps the keys that land on that
//! node's points; everything else stays put.
//!
//! - [`Ring`] — the continuum of virtual points plus the member set, with
//!   [`Ring::find_node`] and [`Ring::find_nodes`] lookups.
//! - [`RingHasher`] — position derivation (MD5, SHA-1, BLAKE3, and a
//!   libmemcached-compatible MD5 mode).
//! - [`SharedRing`] — the ring behind an `RwLock` for use across threads.
//!
//! Each member gets `replicas` points at `hash(name ++ index)`. A key is
//! served by the first point at or after `hash(key)`, wrapping around.

mod error;
mod hash;
mod ring;
mod shared;

pub use continuum_types::{HashFunction, HashMode, NodeName, RingConfig};
pub use error::RingError;
pub use hash::RingHasher;
pub use ring::{NodeInfo, Reassignment, Ring, VirtualPoint};
pub use shared::SharedRing;
