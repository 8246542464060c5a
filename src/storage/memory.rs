//! In-memory session store for tests and ephemeral sessions.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::sync::{Arc, Mutex, PoisonError};

use super::{SessionStore, StoreError, StoredSession};

/// Keeps the session in process memory only. Clones share the same slot, so
/// a test can hand one clone to the auth manager and inspect the other.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<StoredSession>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemoryStore {
    fn restore(&self) -> Result<Option<StoredSession>, StoreError> {
        Ok(self.slot().clone())
    }

    fn persist(&self, session: &StoredSession) -> Result<(), StoreError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}
