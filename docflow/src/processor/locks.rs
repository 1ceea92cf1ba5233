//! In-process mutual exclusion per record.
//!
//! The URL guard alone cannot stop two concurrent attempts on the same row
//! from both passing it. Holding a [`RecordLockGuard`] while a row is read,
//! materialized and written back closes that window within one process.
//! Cross-process exclusion is left to the host.

use dashmap::DashSet;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Derives a stable lock key from its components.
#[must_use]
pub fn lock_key(components: &[&str]) -> String {
    let combined = components.join(":");
    let mut hasher = Sha256::new();
    hasher.update(combined.as_bytes());
    let result = hasher.finalize();
    format!("lock:{}", hex::encode(&result[..16]))
}

/// Set of records currently being processed.
#[derive(Debug, Default)]
pub struct RecordLocks {
    held: DashSet<String>,
}

impl RecordLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tries to take the lock for `key`.
    ///
    /// Returns `None` if another holder has it. The lock is released when
    /// the guard is dropped.
    #[must_use]
    pub fn try_acquire(self: &Arc<Self>, key: impl Into<String>) -> Option<RecordLockGuard> {
        let key = key.into();
        if self.held.insert(key.clone()) {
            Some(RecordLockGuard {
                locks: Arc::clone(self),
                key,
            })
        } else {
            None
        }
    }

    /// Returns true if `key` is currently held.
    #[must_use]
    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(key)
    }

    /// Returns the number of held locks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// Returns true if no lock is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Releases its record lock on drop.
#[derive(Debug)]
pub struct RecordLockGuard {
    locks: Arc<RecordLocks>,
    key: String,
}

impl RecordLockGuard {
    /// Returns the locked key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for RecordLockGuard {
    fn drop(&mut self) {
        self.locks.held.remove(&self.key);
    }
}
