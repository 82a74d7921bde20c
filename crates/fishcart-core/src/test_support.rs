//! Mock collaborators for state machine and dispatcher tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use fishcart_types::catalog::{Cart, CartLine, Product};
use fishcart_types::chat::{ChatId, ChatSession};
use fishcart_types::error::{CommerceError, GatewayError, StoreError};
use fishcart_types::event::Keyboard;

use crate::commerce::CommerceBackend;
use crate::gateway::MessagingGateway;
use crate::session::SessionStore;

/// In-memory commerce backend recording every mutating call.
pub struct MockCommerce {
    products: Vec<Product>,
    carts: Mutex<HashMap<ChatId, Cart>>,
    upserts: Mutex<Vec<(ChatId, i64, u32)>>,
    deletes: Mutex<Vec<i64>>,
    fail_catalog: Mutex<bool>,
    delete_not_found: Mutex<bool>,
    catalog_delay: Mutex<Option<Duration>>,
    next_cart_id: Mutex<i64>,
}

impl MockCommerce {
    /// Backend with `n` products, ids 1..=n.
    pub fn with_products(n: i64) -> Self {
        let products = (1..=n)
            .map(|id| Product {
                id,
                title: format!("Fish {id}"),
                description: format!("A very tasty product {id}"),
            })
            .collect();
        Self {
            products,
            carts: Mutex::new(HashMap::new()),
            upserts: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            fail_catalog: Mutex::new(false),
            delete_not_found: Mutex::new(false),
            catalog_delay: Mutex::new(None),
            next_cart_id: Mutex::new(1),
        }
    }

    pub fn fail_catalog(&self) {
        *self.fail_catalog.lock().unwrap() = true;
    }

    pub fn fail_delete_with_not_found(&self) {
        *self.delete_not_found.lock().unwrap() = true;
    }

    /// Slow down `list_catalog` (for serialization tests).
    pub fn set_catalog_delay(&self, delay: Duration) {
        *self.catalog_delay.lock().unwrap() = Some(delay);
    }

    /// Seed a cart with one line, creating the cart if needed.
    pub fn put_cart_line(&self, chat_id: &ChatId, line: CartLine) {
        let mut carts = self.carts.lock().unwrap();
        let mut next_id = self.next_cart_id.lock().unwrap();
        let cart = carts.entry(chat_id.clone()).or_insert_with(|| {
            let cart = Cart {
                id: *next_id,
                chat_id: chat_id.clone(),
                email: None,
                lines: Vec::new(),
            };
            *next_id += 1;
            cart
        });
        cart.lines.push(line);
    }

    pub fn upsert_calls(&self) -> Vec<(ChatId, i64, u32)> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn deleted_lines(&self) -> Vec<i64> {
        self.deletes.lock().unwrap().clone()
    }
}

impl CommerceBackend for MockCommerce {
    async fn list_catalog(&self) -> Result<Vec<Product>, CommerceError> {
        let delay = *self.catalog_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_catalog.lock().unwrap() {
            return Err(CommerceError::Transport("catalog down".to_string()));
        }
        Ok(self.products.clone())
    }

    async fn get_product(&self, product_id: i64) -> Result<(Product, Vec<u8>), CommerceError> {
        let product = Product {
            id: product_id,
            title: format!("Fish {product_id}"),
            description: format!("A very tasty product {product_id}"),
        };
        Ok((product, vec![0xAB, 0xCD]))
    }

    async fn upsert_cart_line(
        &self,
        chat_id: &ChatId,
        product_id: i64,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        self.upserts
            .lock()
            .unwrap()
            .push((chat_id.clone(), product_id, quantity));
        self.put_cart_line(
            chat_id,
            CartLine {
                id: product_id * 1000 + i64::from(quantity),
                product_title: format!("Fish {product_id}"),
                quantity,
            },
        );
        Ok(())
    }

    async fn list_cart(&self, chat_id: &ChatId) -> Result<Option<Cart>, CommerceError> {
        Ok(self.carts.lock().unwrap().get(chat_id).cloned())
    }

    async fn delete_cart_line(&self, line_id: i64) -> Result<(), CommerceError> {
        if *self.delete_not_found.lock().unwrap() {
            return Err(CommerceError::NotFound);
        }
        self.deletes.lock().unwrap().push(line_id);
        for cart in self.carts.lock().unwrap().values_mut() {
            cart.lines.retain(|line| line.id != line_id);
        }
        Ok(())
    }

    async fn set_checkout_email(
        &self,
        chat_id: &ChatId,
        email: &str,
    ) -> Result<bool, CommerceError> {
        let mut carts = self.carts.lock().unwrap();
        match carts.get_mut(chat_id) {
            Some(cart) => {
                cart.email = Some(email.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_checkout_email(&self, chat_id: &ChatId) -> Result<Option<String>, CommerceError> {
        Ok(self
            .carts
            .lock()
            .unwrap()
            .get(chat_id)
            .and_then(|cart| cart.email.clone()))
    }
}

/// What a [`RecordingGateway`] saw go out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photo {
        caption: String,
        keyboard: Option<Keyboard>,
    },
    Deleted {
        message_id: i64,
    },
}

/// Gateway that records outbound effects instead of sending them.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessagingGateway for RecordingGateway {
    async fn send_message(
        &self,
        _chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push(Sent::Message {
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat_id: &ChatId,
        _image: &[u8],
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), GatewayError> {
        self.sent.lock().unwrap().push(Sent::Photo {
            caption: caption.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        _chat_id: &ChatId,
        message_id: i64,
    ) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Deleted { message_id });
        Ok(())
    }
}

/// In-memory session store.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<ChatId, ChatSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct read of the stored session, bypassing the trait.
    pub fn stored(&self, chat_id: &ChatId) -> Option<ChatSession> {
        self.sessions.lock().unwrap().get(chat_id).cloned()
    }
}

impl SessionStore for MemoryStore {
    async fn load(&self, chat_id: &ChatId) -> Result<ChatSession, StoreError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .get(chat_id)
            .cloned()
            .unwrap_or_else(|| ChatSession::start(chat_id.clone())))
    }

    async fn save(&self, session: &ChatSession) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.chat_id.clone(), session.clone());
        Ok(())
    }
}
