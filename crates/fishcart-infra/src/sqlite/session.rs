//! SQLite session store implementation.
//!
//! Implements `SessionStore` from `fishcart-core`: one `chat_sessions` row
//! per chat, keyed by chat id, upserted on every save. A chat with no row
//! loads as the implicit `Start` session.

use chrono::Utc;
use sqlx::Row;

use fishcart_core::session::SessionStore;
use fishcart_types::chat::{ChatId, ChatSession, ConversationState};
use fishcart_types::error::StoreError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new session store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Number of stored sessions. Doubles as a reachability probe for the
    /// `status` command.
    pub async fn session_count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chat_sessions")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        row.try_get("n")
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl SessionStore for SqliteSessionStore {
    async fn load(&self, chat_id: &ChatId) -> Result<ChatSession, StoreError> {
        let row = sqlx::query(
            "SELECT state, pending_product FROM chat_sessions WHERE chat_id = ?",
        )
        .bind(chat_id.as_str())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let Some(row) = row else {
            return Ok(ChatSession::start(chat_id.clone()));
        };

        let state_name: String = row
            .try_get("state")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let state: ConversationState = state_name.parse().map_err(StoreError::Corrupt)?;
        let pending_product: Option<i64> = row
            .try_get("pending_product")
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(ChatSession {
            chat_id: chat_id.clone(),
            state,
            pending_product,
        })
    }

    async fn save(&self, session: &ChatSession) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO chat_sessions (chat_id, state, pending_product, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (chat_id) DO UPDATE SET
                   state = excluded.state,
                   pending_product = excluded.pending_product,
                   updated_at = excluded.updated_at"#,
        )
        .bind(session.chat_id.as_str())
        .bind(session.state.to_string())
        .bind(session.pending_product)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    // The TempDir guard rides along so the directory outlives the pool.
    async fn test_store() -> (SqliteSessionStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteSessionStore::new(pool), dir)
    }

    #[tokio::test]
    async fn test_missing_row_loads_as_start() {
        let (store, _dir) = test_store().await;
        let chat = ChatId::from(42);

        let session = store.load(&chat).await.unwrap();
        assert_eq!(session.state, ConversationState::Start);
        assert!(session.pending_product.is_none());
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let (store, _dir) = test_store().await;
        let chat = ChatId::from(42);

        let session = ChatSession {
            chat_id: chat.clone(),
            state: ConversationState::QuantitySelect,
            pending_product: Some(7),
        };
        store.save(&session).await.unwrap();

        let loaded = store.load(&chat).await.unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn test_save_upserts_last_write_wins() {
        let (store, _dir) = test_store().await;
        let chat = ChatId::from(42);

        store
            .save(&ChatSession::start(chat.clone()).with_state(ConversationState::Menu))
            .await
            .unwrap();
        store
            .save(&ChatSession::start(chat.clone()).with_state(ConversationState::Cart))
            .await
            .unwrap();

        let loaded = store.load(&chat).await.unwrap();
        assert_eq!(loaded.state, ConversationState::Cart);
    }

    #[tokio::test]
    async fn test_pending_product_cleared_on_save() {
        let (store, _dir) = test_store().await;
        let chat = ChatId::from(42);

        store
            .save(
                &ChatSession::start(chat.clone())
                    .with_pending(ConversationState::QuantitySelect, 7),
            )
            .await
            .unwrap();
        store
            .save(&ChatSession::start(chat.clone()).cleared(ConversationState::Menu))
            .await
            .unwrap();

        let loaded = store.load(&chat).await.unwrap();
        assert_eq!(loaded.state, ConversationState::Menu);
        assert!(loaded.pending_product.is_none());
    }

    #[tokio::test]
    async fn test_chats_are_isolated() {
        let (store, _dir) = test_store().await;

        store
            .save(&ChatSession::start(ChatId::from(1)).with_state(ConversationState::Menu))
            .await
            .unwrap();
        store
            .save(&ChatSession::start(ChatId::from(2)).with_state(ConversationState::Cart))
            .await
            .unwrap();

        assert_eq!(
            store.load(&ChatId::from(1)).await.unwrap().state,
            ConversationState::Menu
        );
        assert_eq!(
            store.load(&ChatId::from(2)).await.unwrap().state,
            ConversationState::Cart
        );
        assert_eq!(store.session_count().await.unwrap(), 2);
    }
}
