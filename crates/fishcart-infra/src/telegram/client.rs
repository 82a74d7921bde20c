//! TelegramGateway -- concrete [`MessagingGateway`] implementation.
//!
//! Covers exactly the Bot API surface the shop flow needs: long-polled
//! `getUpdates`, `sendMessage`/`sendPhoto` with inline keyboards,
//! `deleteMessage`, and `answerCallbackQuery`. The bot token is wrapped in
//! [`secrecy::SecretString`]; it appears only in request URLs, never in
//! logs or Debug output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;

use fishcart_core::gateway::MessagingGateway;
use fishcart_types::chat::ChatId;
use fishcart_types::error::GatewayError;
use fishcart_types::event::Keyboard;

use super::types::{ApiResponse, InlineKeyboardMarkup, Update};

/// Telegram Bot API client.
pub struct TelegramGateway {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl TelegramGateway {
    /// Create a new gateway for the given bot token.
    pub fn new(token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: "https://api.telegram.org".to_string(),
            token,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.base_url,
            self.token.expose_secret()
        )
    }

    /// Unwrap a Bot API envelope; `ok: false` becomes an error even when
    /// the HTTP status was 2xx.
    async fn read_result<T: DeserializeOwned + Default>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The URL carries the bot token, so only status and body are
            // logged here.
            tracing::warn!(status = %status, body = %body, "Telegram API error response");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !envelope.ok {
            let description = envelope.description.unwrap_or_default();
            tracing::warn!(description = %description, "Telegram API returned ok=false");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body: description,
            });
        }
        envelope.result.ok_or_else(|| {
            GatewayError::Transport("ok response without result".to_string())
        })
    }

    /// Long-poll for updates after `offset`.
    ///
    /// Blocks server-side up to `timeout_secs`; the request timeout is
    /// padded above it so the poll itself never trips the client timeout.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, GatewayError> {
        let mut body = json!({ "timeout": timeout_secs });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }

        let response = self
            .client
            .post(self.url("getUpdates"))
            .timeout(Duration::from_secs(timeout_secs + 10))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Self::read_result(response).await
    }

    /// Acknowledge a callback query so the client stops its spinner.
    pub async fn answer_callback(&self, callback_query_id: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url("answerCallbackQuery"))
            .json(&json!({ "callback_query_id": callback_query_id }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        // Result payload is just `true`; only the envelope matters.
        let _: bool = Self::read_result(response).await?;
        Ok(())
    }
}

impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), GatewayError> {
        let mut body = json!({
            "chat_id": chat_id.as_str(),
            "text": text,
        });
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(InlineKeyboardMarkup::from(keyboard))
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
        }

        let response = self
            .client
            .post(self.url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let _: serde_json::Value = Self::read_result(response).await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: &ChatId,
        image: &[u8],
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), GatewayError> {
        let photo = reqwest::multipart::Part::bytes(image.to_vec()).file_name("photo.jpg");
        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo);
        if let Some(keyboard) = keyboard {
            let markup = serde_json::to_string(&InlineKeyboardMarkup::from(keyboard))
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            form = form.text("reply_markup", markup);
        }

        let response = self
            .client
            .post(self.url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let _: serde_json::Value = Self::read_result(response).await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: &ChatId, message_id: i64) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url("deleteMessage"))
            .json(&json!({
                "chat_id": chat_id.as_str(),
                "message_id": message_id,
            }))
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let _: bool = Self::read_result(response).await?;
        Ok(())
    }
}
