//! Catalog and cart records as the bot sees them.
//!
//! All of these are read from the commerce backend; the bot never owns
//! catalog data. Quantities are kilograms, matching the shop's unit.

use serde::{Deserialize, Serialize};

use crate::chat::ChatId;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// One product+quantity record attached to a chat's cart.
///
/// `id` is the cart-line id (the backend's cart-product id), not the
/// product id; deletion is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub product_title: String,
    pub quantity: u32,
}

/// A chat's cart: at most one per chat, created lazily on first add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub chat_id: ChatId,
    pub email: Option<String>,
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Whether the cart renders as empty (no lines).
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
