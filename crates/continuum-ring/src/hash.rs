//! Position derivation for node points and lookup keys.
//!
//! Every digest is folded into a `u64` ring position:
//!
//! | Function | Mode           | Digest window | Byte order    |
//! |----------|----------------|---------------|---------------|
//! | MD5      | `normal`       | bytes 8..16   | little-endian |
//! | MD5      | `libmemcached` | bytes 0..4    | little-endian (u32) |
//! | SHA-1    | `normal`       | bytes 12..20  | big-endian    |
//! | BLAKE3   | `normal`       | bytes 0..8    | little-endian |
//!
//! Point inputs are `name ++ index` in normal mode and `name ++ "-" ++ index`
//! in libmemcached mode, with the replica index written in ASCII decimal.

use continuum_types::{HashFunction, HashMode, NodeName};
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::error::RingError;

/// Maps node points and keys onto the ring using one hash function and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingHasher {
    function: HashFunction,
    mode: HashMode,
}

impl RingHasher {
    /// Create a hasher, rejecting mode/function pairings that have no defined
    /// derivation (libmemcached mode is MD5 only).
    pub fn new(function: HashFunction, mode: HashMode) -> Result<Self, RingError> {
        if mode == HashMode::Libmemcached && function != HashFunction::Md5 {
            return Err(RingError::InvalidConfig(format!(
                "{mode} mode requires md5, got {function}"
            )));
        }
        Ok(Self { function, mode })
    }

    /// The configured hash function.
    pub fn function(&self) -> HashFunction {
        self.function
    }

    /// The configured position mode.
    pub fn mode(&self) -> HashMode {
        self.mode
    }

    /// Ring position of a lookup key.
    pub fn key_position(&self, key: &[u8]) -> u64 {
        self.digest(key)
    }

    /// Ring position of virtual point `replica` of `node`.
    pub fn point_position(&self, node: &NodeName, replica: u32) -> u64 {
        let index = replica.to_string();
        let mut input = Vec::with_capacity(node.len() + index.len() + 1);
        input.extend_from_slice(node.as_bytes());
        if self.mode == HashMode::Libmemcached {
            input.push(b'-');
        }
        input.extend_from_slice(index.as_bytes());
        self.digest(&input)
    }

    fn digest(&self, data: &[u8]) -> u64 {
        match (self.function, self.mode) {
            (HashFunction::Md5, HashMode::Libmemcached) => {
                let hash = Md5::digest(data);
                u64::from(u32::from_le_bytes(window(&hash[0..4])))
            }
            (HashFunction::Md5, _) => {
                let hash = Md5::digest(data);
                u64::from_le_bytes(window(&hash[8..16]))
            }
            (HashFunction::Sha1, _) => {
                let hash = Sha1::digest(data);
                u64::from_be_bytes(window(&hash[12..20]))
            }
            (HashFunction::Blake3, _) => {
                let hash = blake3::hash(data);
                u64::from_le_bytes(window(&hash.as_bytes()[..8]))
            }
        }
    }
}

/// Copy a fixed-size digest window into an array.
fn window<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
