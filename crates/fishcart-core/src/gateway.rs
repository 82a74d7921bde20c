//! Messaging gateway trait.
//!
//! The abstract chat transport: the state machine emits its effects through
//! this trait and never sees the underlying messenger. The Telegram
//! implementation lives in `fishcart-infra`.

use fishcart_types::chat::ChatId;
use fishcart_types::error::GatewayError;
use fishcart_types::event::Keyboard;

/// Outbound side of the chat transport.
pub trait MessagingGateway: Send + Sync {
    /// Send a text message, optionally with an inline keyboard.
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;

    /// Send a photo with a caption, optionally with an inline keyboard.
    fn send_photo(
        &self,
        chat_id: &ChatId,
        image: &[u8],
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;

    /// Delete a previously sent message.
    fn delete_message(
        &self,
        chat_id: &ChatId,
        message_id: i64,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}
