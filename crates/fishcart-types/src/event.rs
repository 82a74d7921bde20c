//! Inbound events, callback-token grammar, and outbound keyboards.
//!
//! The messaging gateway produces [`Event`]s and consumes [`Keyboard`]s;
//! everything in between speaks these types. Button callback data uses a
//! short token grammar (`cart`, `menu`, `back`, `pay`, `add:{id}`,
//! `del:{id}`, bare numbers) parsed into [`CallbackToken`]. Bare numeric
//! tokens are ambiguous on their own -- a product id on the menu, a
//! quantity on the quantity keyboard -- so the state machine resolves them
//! against the current state.

use serde::{Deserialize, Serialize};

use crate::chat::ChatId;

/// One inbound event from the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub chat_id: ChatId,
    /// Id of the message the event originated from. For button presses this
    /// is the message carrying the keyboard, which some transitions delete.
    pub message_id: i64,
    pub kind: EventKind,
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Free-form text message (including commands such as `/start`).
    Text(String),
    /// Inline keyboard button press carrying its callback token.
    ButtonPress(String),
}

/// Parsed form of a button callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackToken {
    /// `cart` -- show the cart view.
    Cart,
    /// `menu` -- back to the catalog menu.
    Menu,
    /// `back` -- leave the product description.
    Back,
    /// `pay` -- start checkout.
    Pay,
    /// `add:{product_id}` -- add a product to the cart.
    Add(i64),
    /// `del:{cart_line_id}` -- remove a cart line.
    Delete(i64),
    /// Bare number: product id or quantity depending on state.
    Number(i64),
    /// Anything else; treated as unmatched by every state.
    Unknown,
}

impl CallbackToken {
    pub fn parse(token: &str) -> Self {
        match token {
            "cart" => return CallbackToken::Cart,
            "menu" => return CallbackToken::Menu,
            "back" => return CallbackToken::Back,
            "pay" => return CallbackToken::Pay,
            _ => {}
        }
        if let Some(id) = token.strip_prefix("add:") {
            return id
                .parse()
                .map(CallbackToken::Add)
                .unwrap_or(CallbackToken::Unknown);
        }
        if let Some(id) = token.strip_prefix("del:") {
            return id
                .parse()
                .map(CallbackToken::Delete)
                .unwrap_or(CallbackToken::Unknown);
        }
        token
            .parse()
            .map(CallbackToken::Number)
            .unwrap_or(CallbackToken::Unknown)
    }
}

/// One inline keyboard button: visible label + callback token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub token: String,
}

impl Button {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

/// Rows of buttons attached to an outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// Append a row of buttons.
    pub fn push_row(&mut self, row: Vec<Button>) {
        self.rows.push(row);
    }
}
