//! Per-conversation turn serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use crate::domain::foundation::ConversationId;

/// Registry of one async mutex per conversation id.
///
/// Turns holding the same conversation's lock run one at a time; other
/// conversations are unaffected. Entries nobody holds are pruned on the
/// next acquisition.
#[derive(Debug, Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `conversation_id`, creating it if needed.
    pub fn lock_for(&self, conversation_id: &ConversationId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.retain(|id, lock| id == conversation_id || Arc::strong_count(lock) > 1);
        locks
            .entry(conversation_id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Number of tracked conversations.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_shares_a_lock() {
        let locks = ConversationLocks::new();
        let id = ConversationId::new("a").unwrap();
        let first = locks.lock_for(&id);
        let second = locks.lock_for(&id);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn different_ids_get_different_locks() {
        let locks = ConversationLocks::new();
        let a = locks.lock_for(&ConversationId::new("a").unwrap());
        let b = locks.lock_for(&ConversationId::new("b").unwrap());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unheld_locks_are_pruned() {
        let locks = ConversationLocks::new();
        drop(locks.lock_for(&ConversationId::new("a").unwrap()));
        let _held = locks.lock_for(&ConversationId::new("b").unwrap());
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn second_holder_waits() {
        let locks = ConversationLocks::new();
        let id = ConversationId::new("a").unwrap();
        let lock = locks.lock_for(&id);
        let guard = lock.lock().await;

        let other = locks.lock_for(&id);
        assert!(other.try_lock().is_err());
        drop(guard);
        assert!(other.try_lock().is_ok());
    }
}
