//! StrapiCommerce -- concrete [`CommerceBackend`] implementation.
//!
//! Talks to a Strapi v4 instance at `http://{host}:{port}/api/...` with a
//! static bearer token. Every operation is one or a few synchronous
//! request/response calls; a non-2xx response becomes
//! [`CommerceError::Api`] (404s become `NotFound`) and is propagated
//! unretried -- the dispatcher owns the retry story.
//!
//! The bearer token is wrapped in [`secrecy::SecretString`] and only
//! exposed when building request headers.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

use fishcart_core::commerce::CommerceBackend;
use fishcart_types::catalog::{Cart, CartLine, Product};
use fishcart_types::chat::ChatId;
use fishcart_types::error::CommerceError;

use super::types::{
    CartAttributes, CartProductAttributes, Connect, ConnectCartProducts, DataBody, Entry,
    ListResponse, NewCart, NewCartProduct, ProductAttributes, SetEmail, SingleResponse,
};

/// Strapi-backed commerce client.
pub struct StrapiCommerce {
    client: reqwest::Client,
    base_url: String,
    api_token: SecretString,
}

impl StrapiCommerce {
    /// Create a new client for the backend at `base_url`
    /// (e.g. `http://localhost:1337`).
    pub fn new(base_url: String, api_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url,
            api_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn bearer(&self) -> String {
        format!("bearer {}", self.api_token.expose_secret())
    }

    /// Map a response: 2xx deserializes, 404 is `NotFound`, anything else
    /// is an `Api` error carrying the body.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CommerceError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CommerceError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Strapi API error response");
            return Err(CommerceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| CommerceError::Deserialization(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CommerceError> {
        tracing::debug!(url = %url, "Strapi GET request");
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| CommerceError::Transport(e.to_string()))?;
        Self::read_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, CommerceError> {
        tracing::debug!(url = %url, "Strapi POST request");
        let response = self
            .client
            .post(url)
            .header("Authorization", self.bearer())
            .json(body)
            .send()
            .await
            .map_err(|e| CommerceError::Transport(e.to_string()))?;
        Self::read_json(response).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, CommerceError> {
        tracing::debug!(url = %url, "Strapi PUT request");
        let response = self
            .client
            .put(url)
            .header("Authorization", self.bearer())
            .json(body)
            .send()
            .await
            .map_err(|e| CommerceError::Transport(e.to_string()))?;
        Self::read_json(response).await
    }

    /// Fetch the chat's cart entry with its relations populated.
    async fn fetch_cart_entry(
        &self,
        chat_id: &ChatId,
    ) -> Result<Option<Entry<CartAttributes>>, CommerceError> {
        let response: ListResponse<CartAttributes> = self
            .get_json(
                &self.url("/carts"),
                &[
                    ("filters[chat_id][$eq]", chat_id.as_str()),
                    ("populate", "*"),
                ],
            )
            .await?;
        Ok(response.data.into_iter().next())
    }

    /// Create a cart-product record and return its id.
    async fn create_cart_product(
        &self,
        product_id: i64,
        quantity: u32,
    ) -> Result<i64, CommerceError> {
        let body = DataBody::new(NewCartProduct {
            product: product_id,
            quantity,
        });
        let response: SingleResponse<CartProductAttributes> =
            self.post_json(&self.url("/cart-products"), &body).await?;
        Ok(response.data.id)
    }

    /// Resolve one cart line: the cart-product record with its product
    /// relation populated, for the title.
    async fn fetch_cart_line(&self, line_id: i64) -> Result<CartLine, CommerceError> {
        let response: SingleResponse<CartProductAttributes> = self
            .get_json(
                &self.url(&format!("/cart-products/{line_id}")),
                &[("populate", "*")],
            )
            .await?;

        let title = response
            .data
            .attributes
            .product
            .and_then(|relation| relation.data)
            .map(|entry| entry.attributes.title)
            .ok_or(CommerceError::NotFound)?;

        Ok(CartLine {
            id: response.data.id,
            product_title: title,
            quantity: response.data.attributes.quantity,
        })
    }
}

impl CommerceBackend for StrapiCommerce {
    async fn list_catalog(&self) -> Result<Vec<Product>, CommerceError> {
        let response: ListResponse<ProductAttributes> =
            self.get_json(&self.url("/products"), &[]).await?;

        Ok(response
            .data
            .into_iter()
            .map(|entry| Product {
                id: entry.id,
                title: entry.attributes.title,
                description: entry.attributes.description,
            })
            .collect())
    }

    async fn get_product(&self, product_id: i64) -> Result<(Product, Vec<u8>), CommerceError> {
        let response: SingleResponse<ProductAttributes> = self
            .get_json(
                &self.url(&format!("/products/{product_id}")),
                &[("populate", "Picture")],
            )
            .await?;

        let picture_path = response
            .data
            .attributes
            .picture
            .as_ref()
            .and_then(|relation| relation.data.first())
            .map(|entry| entry.attributes.url.clone())
            .ok_or(CommerceError::NotFound)?;

        let product = Product {
            id: response.data.id,
            title: response.data.attributes.title,
            description: response.data.attributes.description,
        };

        // Picture urls are host-relative.
        let image_url = format!("{}{}", self.base_url, picture_path);
        let image_response = self
            .client
            .get(&image_url)
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| CommerceError::Transport(e.to_string()))?;
        let status = image_response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url = %image_url, "Strapi picture fetch failed");
            return Err(CommerceError::Api {
                status: status.as_u16(),
                body: String::new(),
            });
        }
        let image = image_response
            .bytes()
            .await
            .map_err(|e| CommerceError::Transport(e.to_string()))?
            .to_vec();

        Ok((product, image))
    }

    async fn upsert_cart_line(
        &self,
        chat_id: &ChatId,
        product_id: i64,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let existing = self.fetch_cart_entry(chat_id).await?;

        // Always a fresh cart-product: repeated adds of the same product
        // append lines rather than merging quantities (kept as deployed).
        let line_id = self.create_cart_product(product_id, quantity).await?;
        let connect = Connect {
            connect: vec![line_id],
        };

        match existing {
            None => {
                let body = DataBody::new(NewCart {
                    chat_id: chat_id.to_string(),
                    cart_products: connect,
                });
                let _: SingleResponse<CartAttributes> =
                    self.post_json(&self.url("/carts"), &body).await?;
            }
            Some(cart) => {
                let body = DataBody::new(ConnectCartProducts {
                    cart_products: connect,
                });
                let _: SingleResponse<CartAttributes> = self
                    .put_json(&self.url(&format!("/carts/{}", cart.id)), &body)
                    .await?;
            }
        }

        Ok(())
    }

    async fn list_cart(&self, chat_id: &ChatId) -> Result<Option<Cart>, CommerceError> {
        let Some(entry) = self.fetch_cart_entry(chat_id).await? else {
            return Ok(None);
        };

        // The filtered cart query populates line ids and quantities but not
        // the product relation behind them; titles come one hop further.
        let mut lines = Vec::new();
        if let Some(relation) = &entry.attributes.cart_products {
            for line in &relation.data {
                lines.push(self.fetch_cart_line(line.id).await?);
            }
        }

        Ok(Some(Cart {
            id: entry.id,
            chat_id: chat_id.clone(),
            email: entry.attributes.email,
            lines,
        }))
    }

    async fn delete_cart_line(&self, line_id: i64) -> Result<(), CommerceError> {
        let response = self
            .client
            .delete(self.url(&format!("/cart-products/{line_id}")))
            .header("Authorization", self.bearer())
            .send()
            .await
            .map_err(|e| CommerceError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CommerceError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Strapi API error response");
            return Err(CommerceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn set_checkout_email(
        &self,
        chat_id: &ChatId,
        email: &str,
    ) -> Result<bool, CommerceError> {
        // No cart yet means there is nothing to attach the email to; that
        // is a user-visible failure, not a transport error.
        let Some(cart) = self.fetch_cart_entry(chat_id).await? else {
            return Ok(false);
        };

        let body = DataBody::new(SetEmail {
            email: email.to_string(),
        });
        let _: SingleResponse<CartAttributes> = self
            .put_json(&self.url(&format!("/carts/{}", cart.id)), &body)
            .await?;
        Ok(true)
    }

    async fn get_checkout_email(&self, chat_id: &ChatId) -> Result<Option<String>, CommerceError> {
        Ok(self
            .fetch_cart_entry(chat_id)
            .await?
            .and_then(|entry| entry.attributes.email))
    }
}
