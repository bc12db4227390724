//! Shared types for the continuum hash ring.
//!
//! This crate defines the identifiers and configuration used across the
//! workspace: node identity ([`NodeName`]), the hash primitives a ring may be
//! built on ([`HashFunction`], [`HashMode`]) and ring construction parameters
//! ([`RingConfig`]).

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node identity
// ---------------------------------------------------------------------------

/// Opaque identity of a ring member.
///
/// Names are arbitrary bytes and need not be valid UTF-8. Equality, ordering
/// and hashing are byte-exact, so a `HashMap<NodeName, _>` can be queried with
/// a plain `&[u8]`. Cloning is cheap: every virtual point on a ring carries its
/// node's name.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName(Bytes);

impl NodeName {
    /// Create a name by copying the given bytes.
    pub fn new(name: impl AsRef<[u8]>) -> Self {
        Self(Bytes::copy_from_slice(name.as_ref()))
    }

    /// Return the raw bytes of this name.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the name in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the name has no bytes. Empty names are never ring members.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the name, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for NodeName {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for NodeName {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for NodeName {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl<const N: usize> From<&[u8; N]> for NodeName {
    fn from(bytes: &[u8; N]) -> Self {
        Self::new(bytes)
    }
}

impl From<String> for NodeName {
    fn from(name: String) -> Self {
        Self(Bytes::from(name))
    }
}

impl From<&str> for NodeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<[u8]> for NodeName {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for NodeName {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8]> for NodeName {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) if !s.chars().any(char::is_control) => f.pad(s),
            _ => {
                f.write_str("0x")?;
                for byte in self.0.iter() {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeName({self})")
    }
}

// ---------------------------------------------------------------------------
// Hash primitives
// ---------------------------------------------------------------------------

/// Error returned when parsing a [`HashFunction`] or [`HashMode`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Digest a ring hashes node points and keys with.
///
/// Every function is folded to a 64-bit ring position; see the ring crate for
/// the exact byte windows used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    /// MD5, the classic ketama digest.
    #[default]
    Md5,
    /// SHA-1.
    Sha1,
    /// BLAKE3.
    Blake3,
}

impl HashFunction {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashFunction::Md5 => "md5",
            HashFunction::Sha1 => "sha1",
            HashFunction::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashFunction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(HashFunction::Md5),
            "sha1" | "sha-1" => Ok(HashFunction::Sha1),
            "blake3" => Ok(HashFunction::Blake3),
            _ => Err(ParseError {
                kind: "hash function",
                value: s.to_string(),
                expected: "md5, sha1, blake3",
            }),
        }
    }
}

/// How node points and keys are turned into positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// 64-bit positions, points hashed from `name ++ index`.
    #[default]
    Normal,
    /// libmemcached/ketama compatible placement: 32-bit MD5 positions, points
    /// hashed from `name ++ "-" ++ index`. Only valid with [`HashFunction::Md5`].
    #[serde(alias = "ketama")]
    Libmemcached,
}

impl HashMode {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HashMode::Normal => "normal",
            HashMode::Libmemcached => "libmemcached",
        }
    }
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(HashMode::Normal),
            "libmemcached" | "ketama" => Ok(HashMode::Libmemcached),
            _ => Err(ParseError {
                kind: "hash mode",
                value: s.to_string(),
                expected: "normal, libmemcached",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Parameters fixed for the lifetime of a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Virtual points placed per member. Must be at least 1.
    pub replicas: u32,
    /// Digest used for both point placement and key lookup.
    pub hash: HashFunction,
    /// Position derivation mode.
    pub mode: HashMode,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: 128,
            hash: HashFunction::Md5,
            mode: HashMode::Normal,
        }
    }
}
