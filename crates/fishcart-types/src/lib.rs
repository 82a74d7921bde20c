//! Shared domain types for the fishcart shop bot.
//!
//! Plain data types used across the workspace: chat sessions and the
//! conversation state enum, catalog/cart records, inbound events and
//! outbound keyboards, error enums, and the runtime configuration.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
