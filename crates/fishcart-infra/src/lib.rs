//! Infrastructure implementations for the fishcart shop bot.
//!
//! SQLite-backed session store, the Strapi commerce client, the Telegram
//! gateway, and environment configuration loading. Everything here
//! implements a trait from `fishcart-core`.

pub mod config;
pub mod sqlite;
pub mod strapi;
pub mod telegram;
