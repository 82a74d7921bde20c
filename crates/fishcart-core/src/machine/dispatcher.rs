//! One full dispatch cycle per inbound event.
//!
//! Lock the chat, load its session, run the transition, persist the result.
//! Errors are logged and the event dropped with the stored state untouched,
//! so the next event for that chat retries from where it was. The event
//! loop never dies because of one bad event.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use fishcart_types::chat::ChatId;
use fishcart_types::error::DispatchError;
use fishcart_types::event::Event;

use crate::commerce::CommerceBackend;
use crate::gateway::MessagingGateway;
use crate::session::{ChatLocks, SessionStore};

use super::transition::transition;

/// Wires the store, backend, and gateway into an event handler.
///
/// Cheap to clone; all dependencies are shared. Per-chat serialization is
/// internal -- callers may feed events from any number of tasks.
pub struct Dispatcher<S, C, G> {
    store: Arc<S>,
    backend: Arc<C>,
    gateway: Arc<G>,
    locks: Arc<ChatLocks>,
    tails: Arc<DashMap<ChatId, JoinHandle<()>>>,
}

impl<S, C, G> Clone for Dispatcher<S, C, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            backend: Arc::clone(&self.backend),
            gateway: Arc::clone(&self.gateway),
            locks: Arc::clone(&self.locks),
            tails: Arc::clone(&self.tails),
        }
    }
}

impl<S, C, G> Dispatcher<S, C, G>
where
    S: SessionStore,
    C: CommerceBackend,
    G: MessagingGateway,
{
    pub fn new(store: Arc<S>, backend: Arc<C>, gateway: Arc<G>) -> Self {
        Self {
            store,
            backend,
            gateway,
            locks: Arc::new(ChatLocks::new()),
            tails: Arc::new(DashMap::new()),
        }
    }

    /// Queue one event behind the chat's previous one.
    ///
    /// The chat lock in [`handle_event`](Self::handle_event) serializes
    /// dispatches but does not pin their order: two tasks spawned
    /// back-to-back may reach the lock in either order. Chaining each
    /// spawned task onto the chat's previous task keeps events FIFO per
    /// chat while different chats still run in parallel. Intended for a
    /// single producer (the update poll loop).
    pub fn enqueue(&self, event: Event)
    where
        S: 'static,
        C: 'static,
        G: 'static,
    {
        let prev = self.tails.remove(&event.chat_id).map(|(_, handle)| handle);
        let chat_id = event.chat_id.clone();
        let this = self.clone();
        let handle = tokio::spawn(async move {
            if let Some(prev) = prev {
                // A panicked predecessor must not take the chain down.
                let _ = prev.await;
            }
            this.handle_event(event).await;
        });
        self.tails.insert(chat_id, handle);
    }

    /// Wait for the chat's queued events to finish.
    ///
    /// For shutdown and tests; must not race with `enqueue` for the same
    /// chat.
    pub async fn flush(&self, chat_id: &ChatId) {
        if let Some((_, handle)) = self.tails.remove(chat_id) {
            let _ = handle.await;
        }
    }

    /// Process one inbound event to completion.
    ///
    /// Never returns an error: failures are logged here, the catch-all at
    /// the edge of the system.
    pub async fn handle_event(&self, event: Event) {
        let _guard = self.locks.acquire(&event.chat_id).await;
        if let Err(err) = self.dispatch(&event).await {
            tracing::error!(
                chat_id = %event.chat_id,
                error = %err,
                "dispatch failed, event dropped, state unchanged"
            );
        }
    }

    async fn dispatch(&self, event: &Event) -> Result<(), DispatchError> {
        let session = self.store.load(&event.chat_id).await?;
        let state_before = session.state;

        let next = transition(session, event, self.backend.as_ref(), self.gateway.as_ref()).await?;

        // The single save per dispatch, after all side effects succeeded.
        self.store.save(&next).await?;
        tracing::debug!(
            chat_id = %event.chat_id,
            from = %state_before,
            to = %next.state,
            "dispatched"
        );
        Ok(())
    }
}
