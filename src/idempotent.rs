//! Store-backed idempotent gate.
//!
//! Suppresses duplicate processing of redelivered messages: before
//! handling a message, `add` its deduplication key; process only if the
//! key was novel. The gate holds no state of its own — correctness
//! rests entirely on the backing store's put-if-absent atomicity, not
//! on any in-process lock.
//!
//! Store failures fail closed: the error reaches the caller instead of
//! the message being silently treated as novel or as a duplicate.
//! Either silent default would break the processing guarantee this gate
//! exists to provide.
//!
//! # Example
//!
//! ```
//! use mllp_link::idempotent::IdempotentRepository;
//! use mllp_link::store::MemoryKeyStore;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let gate = IdempotentRepository::new(MemoryKeyStore::new());
//!
//! assert!(gate.add("msg-1").await.unwrap());   // novel, process it
//! assert!(!gate.add("msg-1").await.unwrap());  // redelivery, skip
//! # });
//! ```

use crate::error::Result;
use crate::store::AtomicKeyStore;

/// At-most-once gate over an [`AtomicKeyStore`].
///
/// Safe for concurrent use from many tasks; `add` for a given key
/// returns true to exactly one of any set of concurrent callers.
#[derive(Debug)]
pub struct IdempotentRepository<S> {
    store: S,
}

impl<S: AtomicKeyStore> IdempotentRepository<S> {
    /// Wrap a store in the gate.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reserve `key` for processing.
    ///
    /// Returns true iff this call inserted the key (the message is
    /// novel); false means a duplicate. Atomic end to end: there is no
    /// check-then-set window in which two callers can both see true.
    pub async fn add(&self, key: &str) -> Result<bool> {
        let inserted = self.store.put_if_absent(key).await?;
        if inserted {
            tracing::debug!(key, "key reserved");
        } else {
            tracing::debug!(key, "duplicate key skipped");
        }
        Ok(inserted)
    }

    /// Whether `key` has been processed.
    ///
    /// Pure lookup; may lag behind concurrent mutation on other nodes.
    pub async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains(key).await?)
    }

    /// Release `key`, e.g. when processing failed after reservation and
    /// the message should be accepted again on redelivery.
    ///
    /// Returns whether a deletion occurred.
    pub async fn remove(&self, key: &str) -> Result<bool> {
        let removed = self.store.remove(key).await?;
        if removed {
            tracing::debug!(key, "key released");
        }
        Ok(removed)
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::MllpError;
    use crate::store::test_support::UnreachableStore;
    use crate::store::MemoryKeyStore;

    #[tokio::test]
    async fn test_add_contains_remove_cycle() {
        let gate = IdempotentRepository::new(MemoryKeyStore::new());

        assert!(gate.add("X").await.unwrap());
        assert!(!gate.add("X").await.unwrap());
        assert!(gate.contains("X").await.unwrap());

        assert!(gate.remove("X").await.unwrap());
        assert!(!gate.remove("X").await.unwrap());
        assert!(!gate.contains("X").await.unwrap());
    }

    #[tokio::test]
    async fn test_release_reopens_key() {
        let gate = IdempotentRepository::new(MemoryKeyStore::new());

        assert!(gate.add("X").await.unwrap());
        gate.remove("X").await.unwrap();
        // Undo scenario: after release the key is novel again.
        assert!(gate.add("X").await.unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let gate = IdempotentRepository::new(UnreachableStore);

        assert!(matches!(gate.add("X").await, Err(MllpError::Store(_))));
        assert!(matches!(gate.contains("X").await, Err(MllpError::Store(_))));
        assert!(matches!(gate.remove("X").await, Err(MllpError::Store(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_add_single_winner() {
        let gate = Arc::new(IdempotentRepository::new(MemoryKeyStore::new()));
        let tasks = 64;

        let handles: Vec<_> = (0..tasks)
            .map(|_| {
                let gate = gate.clone();
                tokio::spawn(async move { gate.add("Y").await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1, "exactly one concurrent add may return true");
    }
}
