//! Per-embedding ingest serialization.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use lookalike_core::types::EmbeddingVector;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Serializes ingestion of byte-identical embeddings.
///
/// Ingestions holding the guard for the same embedding run one after the
/// other, so the second one sees the first one's record in its duplicate
/// check. Embeddings that differ in any bit hash to different keys and are
/// not serialized against each other.
#[derive(Clone, Default)]
pub struct IngestLock {
    slots: Slots,
}

impl fmt::Debug for IngestLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestLock")
            .field("held", &self.held())
            .finish()
    }
}

impl IngestLock {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex-encoded SHA-256 of the vector's little-endian bytes.
    pub fn key(vector: &EmbeddingVector) -> String {
        let mut hasher = Sha256::new();
        for value in vector.iter() {
            hasher.update(value.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Waits until no other ingestion of `vector` holds the lock.
    pub async fn acquire(&self, vector: &EmbeddingVector) -> IngestGuard {
        let key = Self::key(vector);
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        IngestGuard {
            guard: Some(slot.lock_owned().await),
            key,
            slots: Arc::clone(&self.slots),
        }
    }

    /// Number of embeddings currently locked or waited on.
    pub fn held(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Releases the embedding's slot when dropped.
pub struct IngestGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: String,
    slots: Slots,
}

impl fmt::Debug for IngestGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestGuard").field("key", &self.key).finish()
    }
}

impl Drop for IngestGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn vector(values: &[f32]) -> EmbeddingVector {
        EmbeddingVector::new(values.to_vec())
    }

    #[test]
    fn test_key_depends_on_values_and_order() {
        let a = IngestLock::key(&vector(&[0.1, 0.2]));
        assert_eq!(a, IngestLock::key(&vector(&[0.1, 0.2])));
        assert_ne!(a, IngestLock::key(&vector(&[0.1, 0.200_001])));
        assert_ne!(a, IngestLock::key(&vector(&[0.2, 0.1])));
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_same_embedding_waits() {
        let lock = IngestLock::new();
        let first = lock.acquire(&vector(&[1.0, 0.0])).await;

        let pending = tokio::time::timeout(
            Duration::from_millis(20),
            lock.acquire(&vector(&[1.0, 0.0])),
        )
        .await;
        assert!(pending.is_err());

        let other = lock.acquire(&vector(&[0.0, 1.0])).await;
        assert_eq!(lock.held(), 2);

        drop(first);
        drop(other);
        assert_eq!(lock.held(), 0);

        let _again = lock.acquire(&vector(&[1.0, 0.0])).await;
        assert_eq!(lock.held(), 1);
    }
}
