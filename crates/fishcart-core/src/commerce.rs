//! Commerce backend trait.
//!
//! Typed operations against the remote catalog/cart API. Implementations
//! live in `fishcart-infra`. Every operation is a single request/response;
//! retry policy belongs to the caller, not the client.

use fishcart_types::catalog::{Cart, Product};
use fishcart_types::chat::ChatId;
use fishcart_types::error::CommerceError;

/// Trait for the remote catalog/cart backend.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait CommerceBackend: Send + Sync {
    /// Fetch the full catalog.
    fn list_catalog(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, CommerceError>> + Send;

    /// Fetch one product together with its picture bytes.
    ///
    /// Fails with [`CommerceError::NotFound`] when the product or its
    /// picture is missing.
    fn get_product(
        &self,
        product_id: i64,
    ) -> impl std::future::Future<Output = Result<(Product, Vec<u8>), CommerceError>> + Send;

    /// Attach a new product+quantity line to the chat's cart, creating the
    /// cart on first use.
    ///
    /// Note: this appends a fresh line on every call, even for a product
    /// already in the cart -- quantities are never merged. That matches the
    /// deployed backend's observed behavior and is kept deliberately.
    fn upsert_cart_line(
        &self,
        chat_id: &ChatId,
        product_id: i64,
        quantity: u32,
    ) -> impl std::future::Future<Output = Result<(), CommerceError>> + Send;

    /// Fetch the chat's cart with its lines. `None` when no cart exists yet.
    fn list_cart(
        &self,
        chat_id: &ChatId,
    ) -> impl std::future::Future<Output = Result<Option<Cart>, CommerceError>> + Send;

    /// Delete one cart line by its id.
    ///
    /// Fails with [`CommerceError::NotFound`] when already deleted; callers
    /// treat that as success.
    fn delete_cart_line(
        &self,
        line_id: i64,
    ) -> impl std::future::Future<Output = Result<(), CommerceError>> + Send;

    /// Attach a checkout email to the chat's cart.
    ///
    /// Returns `Ok(false)` when no cart exists yet (a user-visible failure,
    /// not a transport error).
    fn set_checkout_email(
        &self,
        chat_id: &ChatId,
        email: &str,
    ) -> impl std::future::Future<Output = Result<bool, CommerceError>> + Send;

    /// Read back the stored checkout email, if any.
    fn get_checkout_email(
        &self,
        chat_id: &ChatId,
    ) -> impl std::future::Future<Output = Result<Option<String>, CommerceError>> + Send;
}
