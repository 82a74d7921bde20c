//! Per-chat dispatch serialization.
//!
//! The multi-step flows (stash a product in the description step, consume it
//! in the quantity step) require at-most-one concurrent dispatch per chat.
//! `ChatLocks` hands out one async mutex per chat id; different chats
//! proceed fully in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use fishcart_types::chat::ChatId;

/// One async mutex per chat id.
///
/// Lock entries are created lazily and kept for the process lifetime; a
/// chat's entry is a single `Arc<Mutex<()>>`, so the table stays small.
#[derive(Default)]
pub struct ChatLocks {
    locks: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the chat's lock, waiting if another dispatch holds it.
    pub async fn acquire(&self, chat_id: &ChatId) -> OwnedMutexGuard<()> {
        // Clone the Arc out before awaiting so the map shard is not held
        // across the await point.
        let lock = self
            .locks
            .entry(chat_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Number of chats that have ever been locked (for diagnostics).
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
