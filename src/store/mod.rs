//! Pluggable key/value store capability.
//!
//! The idempotent gate depends on one thing only: an atomic
//! put-if-absent. [`AtomicKeyStore`] expresses that capability so any
//! backend offering the guarantee (a distributed cache, a database with
//! conditional inserts, the in-memory [`MemoryKeyStore`]) can sit
//! behind the gate.

mod memory;

pub use memory::MemoryKeyStore;

use async_trait::async_trait;
use thiserror::Error;

/// Failure from the backing store.
///
/// Store failures always propagate to the caller; the gate never
/// substitutes an answer of its own.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unreachable: {0}")]
    Unreachable(String),
    /// The store rejected or failed the operation.
    #[error("store backend: {0}")]
    Backend(String),
}

/// A key store with atomic conditional insertion.
///
/// Implementations must guarantee that under concurrent calls from any
/// number of tasks or nodes, at most one `put_if_absent(key)` call
/// observes `true` for a given key. There must be no gap between the
/// presence check and the insert.
#[async_trait]
pub trait AtomicKeyStore: Send + Sync {
    /// Insert `key` iff absent. Returns true iff this call inserted it.
    async fn put_if_absent(&self, key: &str) -> Result<bool, StoreError>;

    /// Whether `key` is currently present. Pure lookup, no side effects;
    /// may be stale under concurrent mutation from other nodes.
    async fn contains(&self, key: &str) -> Result<bool, StoreError>;

    /// Delete `key` if present. Returns whether a deletion occurred.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}
