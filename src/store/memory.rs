//! In-process key store.
//!
//! Backed by `DashMap`, whose entry API gives the atomic
//! insert-if-vacant the [`AtomicKeyStore`] contract requires. Suitable
//! for tests and single-node deployments; multi-node dedup needs a
//! shared store behind the same trait.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{AtomicKeyStore, StoreError};

/// `AtomicKeyStore` over a concurrent in-process map.
///
/// Share across tasks by wrapping in `Arc`.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    entries: DashMap<String, ()>,
}

impl MemoryKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of keys currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl AtomicKeyStore for MemoryKeyStore {
    async fn put_if_absent(&self, key: &str) -> Result<bool, StoreError> {
        // Entry holds the shard lock across check and insert.
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }

    async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.contains_key(key))
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }
}
