//! Error types for ring construction, mutation and lookup.

use continuum_types::NodeName;

/// Errors returned by [`Ring`](crate::Ring) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// The ring cannot be built with the given parameters.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),

    /// Node names must contain at least one byte.
    #[error("node name must not be empty")]
    EmptyName,

    /// A replica-set lookup asked for zero nodes.
    #[error("requested node count must be at least 1")]
    ZeroCount,

    /// A lookup was attempted on a ring with no members.
    #[error("ring has no members")]
    EmptyRing,

    /// The node is already a member of the ring.
    #[error("node already in ring: {0}")]
    AlreadyExists(NodeName),

    /// The node is not a member of the ring.
    #[error("node not in ring: {0}")]
    NotFound(NodeName),
}
