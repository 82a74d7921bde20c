//! Telegram Bot API gateway.

pub mod client;
pub mod types;

pub use client::TelegramGateway;
pub use types::InboundEvent;
