//! Durable session persistence.
//!
//! DESIGN
//! ======
//! The browser app kept `{token, user}` in localStorage. The same contract
//! sits behind a small trait here so the auth manager never cares whether
//! the bytes live in a file or in memory, and so tests can swap in failing
//! stores.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::types::User;

/// The persisted `{user, token}` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: User,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable, per-client session persistence.
///
/// Contract: `restore` after an uninterrupted `persist` returns exactly what
/// was persisted; a corrupt payload is purged and reported as absent, never
/// as an error; `clear` is idempotent.
pub trait SessionStore: Send + Sync {
    /// Read any previously persisted session.
    ///
    /// # Errors
    /// Fails only on storage-level faults (e.g. unreadable file). Corrupt
    /// contents are purged and mapped to `Ok(None)`.
    fn restore(&self) -> Result<Option<StoredSession>, StoreError>;

    /// Write the session. No intermediate state is observable to a caller
    /// that restores afterwards.
    ///
    /// # Errors
    /// Fails if the session cannot be written.
    fn persist(&self, session: &StoredSession) -> Result<(), StoreError>;

    /// Remove any persisted session. Succeeds when nothing is stored.
    ///
    /// # Errors
    /// Fails only on storage-level faults.
    fn clear(&self) -> Result<(), StoreError>;
}
