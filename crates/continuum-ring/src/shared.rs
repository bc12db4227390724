//! Lock-per-instance wrapper for sharing one ring between threads.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use continuum_types::NodeName;

use crate::error::RingError;
use crate::ring::Ring;

/// A [`Ring`] behind a single-writer/multi-reader lock.
///
/// Clones share the same ring. Lookups take the read lock and may run
/// concurrently; `add` and `remove` take the write lock. Ring mutations never
/// leave the continuum half-updated, so a poisoned lock is recovered rather
/// than propagated.
#[derive(Debug, Clone)]
pub struct SharedRing {
    inner: Arc<RwLock<Ring>>,
}

impl SharedRing {
    /// Wrap an existing ring.
    pub fn new(ring: Ring) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Ring> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Ring> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with shared access to the ring.
    pub fn read<R>(&self, f: impl FnOnce(&Ring) -> R) -> R {
        f(&self.read_lock())
    }

    /// Run `f` with exclusive access to the ring.
    pub fn write<R>(&self, f: impl FnOnce(&mut Ring) -> R) -> R {
        f(&mut self.write_lock())
    }

    /// See [`Ring::add`].
    pub fn add(&self, node: impl Into<NodeName>) -> Result<(), RingError> {
        self.write_lock().add(node)
    }

    /// See [`Ring::remove`].
    pub fn remove(&self, node: impl AsRef<[u8]>) -> Result<(), RingError> {
        self.write_lock().remove(node)
    }

    /// See [`Ring::find_node`].
    pub fn find_node(&self, key: impl AsRef<[u8]>) -> Result<NodeName, RingError> {
        self.read_lock().find_node(key)
    }

    /// See [`Ring::find_nodes`].
    pub fn find_nodes(
        &self,
        key: impl AsRef<[u8]>,
        count: usize,
    ) -> Result<Vec<NodeName>, RingError> {
        self.read_lock().find_nodes(key, count)
    }

    /// See [`Ring::contains`].
    pub fn contains(&self, node: impl AsRef<[u8]>) -> bool {
        self.read_lock().contains(node)
    }

    /// See [`Ring::members`].
    pub fn members(&self) -> Vec<NodeName> {
        self.read_lock().members()
    }

    /// See [`Ring::node_count`].
    pub fn node_count(&self) -> usize {
        self.read_lock().node_count()
    }

    /// Copy of the ring as it is now, detached from later mutations.
    pub fn snapshot(&self) -> Ring {
        self.read_lock().clone()
    }
}

impl From<Ring> for SharedRing {
    fn from(ring: Ring) -> Self {
        Self::new(ring)
    }
}
