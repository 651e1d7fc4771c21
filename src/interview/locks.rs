//! Per-session mutual exclusion
//!
//! Submitting a message and ending a session both read the transcript, wait
//! on a collaborator, then write. Holding the session's lock across that
//! sequence keeps AI turns from interleaving. Different sessions never
//! contend.
//!
//! A session's entry lives only while some caller holds or waits on it, so
//! abandoned sessions leave nothing behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<LockMap>,
}

/// Exclusive access to one session; releases and prunes on drop
pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    session_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, LockMap> {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Wait for exclusive access to a session
    pub async fn acquire(&self, session_id: &str) -> SessionGuard<'_> {
        let lock = self
            .map()
            .entry(session_id.to_string())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;
        SessionGuard {
            locks: self,
            session_id: session_id.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub fn tracked_sessions(&self) -> usize {
        self.map().len()
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Clones are only taken under the map lock, so a count of one means
        // no other caller holds or waits on this session.
        let mut map = self.locks.map();
        if map
            .get(&self.session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&self.session_id);
        }
    }
}
