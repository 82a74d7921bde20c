//! Keyboard and message-text builders.
//!
//! Pure functions: catalog/cart data in, keyboard + text out. All
//! user-visible strings live here so the transition table stays readable.

use fishcart_types::catalog::{Cart, Product};
use fishcart_types::event::{Button, Keyboard};

pub const MENU_TEXT: &str = "Menu:";
pub const EMPTY_CART_TEXT: &str = "Your cart is empty";
pub const QUANTITY_PROMPT: &str = "Choose the quantity in kg:";
pub const ADDED_TEXT: &str = "Added!";
pub const LINE_DELETED_TEXT: &str = "Item removed from the cart!";
pub const EMAIL_PROMPT: &str = "Please send your email";
pub const EMAIL_RETRY_TEXT: &str = "Try again";

/// Quantity choices offered on the quantity keyboard, in kg.
pub const QUANTITY_CHOICES: [u32; 3] = [1, 5, 10];

/// Catalog menu: one button per product plus the cart shortcut.
pub fn menu_keyboard(products: &[Product]) -> Keyboard {
    let mut keyboard = Keyboard::default();
    for product in products {
        keyboard.push_row(vec![Button::new(&product.title, product.id.to_string())]);
    }
    keyboard.push_row(vec![Button::new("My cart", "cart")]);
    keyboard
}

/// Keyboard under a product description.
pub fn product_keyboard(product_id: i64) -> Keyboard {
    Keyboard::new(vec![
        vec![Button::new("Back", "back")],
        vec![Button::new("Add to cart", format!("add:{product_id}"))],
        vec![Button::new("My cart", "cart")],
    ])
}

/// Quantity picker: one row per choice plus cart/menu shortcuts.
pub fn quantity_keyboard() -> Keyboard {
    let mut keyboard = Keyboard::default();
    for quantity in QUANTITY_CHOICES {
        keyboard.push_row(vec![Button::new(quantity.to_string(), quantity.to_string())]);
    }
    keyboard.push_row(vec![
        Button::new("My cart", "cart"),
        Button::new("To menu", "menu"),
    ]);
    keyboard
}

/// Cart view: line summary text plus delete buttons, menu, and pay.
///
/// `None` (no cart yet) and an empty cart render identically.
pub fn cart_view(cart: Option<&Cart>) -> (String, Keyboard) {
    let mut keyboard = Keyboard::default();

    let text = match cart {
        Some(cart) if !cart.is_empty() => {
            for line in &cart.lines {
                keyboard.push_row(vec![Button::new(
                    format!("Delete {}", line.product_title),
                    format!("del:{}", line.id),
                )]);
            }
            cart.lines
                .iter()
                .map(|line| format!("{} - {} kg", line.product_title, line.quantity))
                .collect::<Vec<_>>()
                .join("\n")
        }
        _ => EMPTY_CART_TEXT.to_string(),
    };

    keyboard.push_row(vec![Button::new("To menu", "menu")]);
    keyboard.push_row(vec![Button::new("Pay", "pay")]);

    (text, keyboard)
}

/// Confirmation after a successful email capture.
pub fn email_saved_text(email: &str) -> String {
    format!("Email {email} saved")
}
