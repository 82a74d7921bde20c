//! Wire types for the Strapi v4 REST API.
//!
//! Responses arrive wrapped in `{"data": {"id": .., "attributes": {..}}}`
//! envelopes (lists use an array under `data`); requests wrap their payload
//! in `{"data": {..}}`. Relation fields nest another envelope. Attribute
//! names are capitalized where the content-type schema capitalizes them
//! (`Title`, `Description`, `Picture`).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

/// `{"data": [..]}` -- collection responses.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<Entry<T>>,
}

/// `{"data": {..}}` -- single-entry responses.
#[derive(Debug, Deserialize)]
pub struct SingleResponse<T> {
    pub data: Entry<T>,
}

/// One entry: numeric id plus its attributes.
#[derive(Debug, Deserialize)]
pub struct Entry<T> {
    pub id: i64,
    pub attributes: T,
}

/// A to-many relation field: `{"data": [..]}`.
#[derive(Debug, Deserialize)]
pub struct ManyRelation<T> {
    pub data: Vec<Entry<T>>,
}

/// A to-one relation field: `{"data": {..} | null}`.
#[derive(Debug, Deserialize)]
pub struct OneRelation<T> {
    pub data: Option<Entry<T>>,
}

// ---------------------------------------------------------------------------
// Attribute shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProductAttributes {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    /// Present only when requested via `populate=Picture`.
    #[serde(rename = "Picture", default)]
    pub picture: Option<ManyRelation<PictureAttributes>>,
}

#[derive(Debug, Deserialize)]
pub struct PictureAttributes {
    /// Path relative to the Strapi host, e.g. `/uploads/cod.jpg`.
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CartAttributes {
    pub chat_id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Present only when requested via `populate=*`.
    #[serde(default)]
    pub cart_products: Option<ManyRelation<CartProductAttributes>>,
}

#[derive(Debug, Deserialize)]
pub struct CartProductAttributes {
    pub quantity: u32,
    /// Present only when requested via `populate=*`.
    #[serde(default)]
    pub product: Option<OneRelation<ProductAttributes>>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// `{"data": {..}}` request wrapper.
#[derive(Debug, Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

impl<T> DataBody<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// `POST /carts` payload: new cart for a chat with its first line connected.
#[derive(Debug, Serialize)]
pub struct NewCart {
    pub chat_id: String,
    pub cart_products: Connect,
}

/// `PUT /carts/{id}` payload: connect more lines to an existing cart.
#[derive(Debug, Serialize)]
pub struct ConnectCartProducts {
    pub cart_products: Connect,
}

/// Strapi relation-connect directive.
#[derive(Debug, Serialize)]
pub struct Connect {
    pub connect: Vec<i64>,
}

/// `POST /cart-products` payload.
#[derive(Debug, Serialize)]
pub struct NewCartProduct {
    pub product: i64,
    pub quantity: u32,
}

/// `PUT /carts/{id}` payload for checkout email capture.
#[derive(Debug, Serialize)]
pub struct SetEmail {
    pub email: String,
}
