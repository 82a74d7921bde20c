//! Chat identity and conversation session types.
//!
//! `ChatSession` is the unit of persistence: one row per chat holding the
//! current conversation state plus the pending product selection. The
//! pending product is persisted alongside the state so the quantity step
//! survives restarts and worker handoff.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a single end-user conversation.
///
/// Telegram chat ids are numeric, but nothing in the bot depends on that;
/// the store and the cart API both treat the id as a string key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a chat within the shopping flow.
///
/// Persisted by canonical name (see `Display`/`FromStr`); a chat with no
/// stored row is implicitly `Start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    Start,
    Menu,
    ProductDescription,
    QuantitySelect,
    Cart,
    AwaitingEmail,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversationState::Start => "START",
            ConversationState::Menu => "MENU",
            ConversationState::ProductDescription => "PRODUCT_DESCRIPTION",
            ConversationState::QuantitySelect => "QUANTITY_SELECT",
            ConversationState::Cart => "CART",
            ConversationState::AwaitingEmail => "AWAITING_EMAIL",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ConversationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "START" => Ok(ConversationState::Start),
            "MENU" => Ok(ConversationState::Menu),
            "PRODUCT_DESCRIPTION" => Ok(ConversationState::ProductDescription),
            "QUANTITY_SELECT" => Ok(ConversationState::QuantitySelect),
            "CART" => Ok(ConversationState::Cart),
            "AWAITING_EMAIL" => Ok(ConversationState::AwaitingEmail),
            other => Err(format!("invalid conversation state: '{other}'")),
        }
    }
}

/// Per-chat conversation session.
///
/// Exactly one session exists per chat id at any time. `pending_product`
/// is the product chosen in the description step and consumed by the
/// quantity step; it is cleared once the cart line is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub chat_id: ChatId,
    pub state: ConversationState,
    pub pending_product: Option<i64>,
}

impl ChatSession {
    /// The implicit session for a chat with no stored state.
    pub fn start(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            state: ConversationState::Start,
            pending_product: None,
        }
    }

    /// Move to a new state, keeping the pending product.
    pub fn with_state(mut self, state: ConversationState) -> Self {
        self.state = state;
        self
    }

    /// Move to a new state and remember a pending product selection.
    pub fn with_pending(mut self, state: ConversationState, product_id: i64) -> Self {
        self.state = state;
        self.pending_product = Some(product_id);
        self
    }

    /// Move to a new state and clear any pending selection.
    pub fn cleared(mut self, state: ConversationState) -> Self {
        self.state = state;
        self.pending_product = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display_fromstr_roundtrip() {
        let states = [
            ConversationState::Start,
            ConversationState::Menu,
            ConversationState::ProductDescription,
            ConversationState::QuantitySelect,
            ConversationState::Cart,
            ConversationState::AwaitingEmail,
        ];
        for state in states {
            let name = state.to_string();
            assert_eq!(name.parse::<ConversationState>().unwrap(), state);
        }
    }

    #[test]
    fn test_state_fromstr_rejects_unknown() {
        assert!("HANDLE_MENU".parse::<ConversationState>().is_err());
        assert!("menu".parse::<ConversationState>().is_err());
    }

    #[test]
    fn test_chat_id_from_i64() {
        let id = ChatId::from(424242);
        assert_eq!(id.as_str(), "424242");
    }

    #[test]
    fn test_start_session_has_no_pending_product() {
        let session = ChatSession::start(ChatId::from(1));
        assert_eq!(session.state, ConversationState::Start);
        assert!(session.pending_product.is_none());
    }

    #[test]
    fn test_with_pending_and_cleared() {
        let session = ChatSession::start(ChatId::from(1))
            .with_pending(ConversationState::QuantitySelect, 7);
        assert_eq!(session.pending_product, Some(7));

        let session = session.cleared(ConversationState::Menu);
        assert_eq!(session.state, ConversationState::Menu);
        assert!(session.pending_product.is_none());
    }
}
