//! Wire types for the Telegram Bot API.
//!
//! Only the slice of the API the bot uses: `getUpdates` polling, inline
//! keyboards, and the update-to-[`Event`] conversion. Text messages become
//! [`EventKind::Text`]; callback queries become [`EventKind::ButtonPress`]
//! with the id of the message carrying the keyboard, which some
//! transitions delete.

use serde::{Deserialize, Serialize};

use fishcart_types::chat::ChatId;
use fishcart_types::event::{Event, EventKind, Keyboard};

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Standard Bot API envelope: `{"ok": true, "result": ..}`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// One inbound event plus the callback-query id to acknowledge, if any.
#[derive(Debug)]
pub struct InboundEvent {
    pub event: Event,
    pub callback_query_id: Option<String>,
}

impl Update {
    /// Convert an update into a dispatchable event.
    ///
    /// Returns `None` for update types the bot does not handle (edits,
    /// channel posts, callback queries without data, ...).
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(callback) = self.callback_query {
            let message = callback.message?;
            let token = callback.data?;
            return Some(InboundEvent {
                event: Event {
                    chat_id: ChatId::from(message.chat.id),
                    message_id: message.message_id,
                    kind: EventKind::ButtonPress(token),
                },
                callback_query_id: Some(callback.id),
            });
        }

        let message = self.message?;
        let text = message.text?;
        Some(InboundEvent {
            event: Event {
                chat_id: ChatId::from(message.chat.id),
                message_id: message.message_id,
                kind: EventKind::Text(text),
            },
            callback_query_id: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|button| InlineKeyboardButton {
                            text: button.label.clone(),
                            callback_data: button.token.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}
