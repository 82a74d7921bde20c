//! Session store trait.
//!
//! One row per chat, last-write-wins. `save` is called exactly once per
//! dispatch, after all side effects succeed -- a crash mid-dispatch leaves
//! the prior state intact, and replaying the event is the recovery path.

use fishcart_types::chat::{ChatId, ChatSession};
use fishcart_types::error::StoreError;

/// Trait for durable per-chat session state.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in `fishcart-infra`.
pub trait SessionStore: Send + Sync {
    /// Load the chat's session. A chat with no stored row gets the implicit
    /// `Start` session.
    fn load(
        &self,
        chat_id: &ChatId,
    ) -> impl std::future::Future<Output = Result<ChatSession, StoreError>> + Send;

    /// Persist the session (upsert).
    fn save(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
