use crate::price::{Price, PriceError};
use serde::{Deserialize, Serialize};

/// One distinct product and its quantity, in the stored shape
/// `{name, price, image, quantity}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
    pub image: String,
    pub quantity: u32,
}

/// Add-to-cart input as submitted by the storefront, price still in display form.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRef {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub image: String,
}

impl ProductRef {
    /// Validates the display price, the only point where prices enter the cart.
    pub fn parse(self) -> Result<Product, PriceError> {
        Ok(Product {
            unit_price: Price::parse(&self.price)?,
            name: self.name,
            image: self.image,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub unit_price: Price,
    pub image: String,
}

impl Product {
    pub fn new(name: impl Into<String>, unit_price: Price, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit_price,
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub index: usize,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub line_total: Price,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "items", rename_all = "lowercase")]
pub enum RenderedCart {
    Empty,
    Populated(Vec<CartLine>),
}

/// Confirmation raised after an add; the UI decides how to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub dismiss_after_ms: u64,
}

impl Notification {
    pub const DEFAULT_DISMISS_MS: u64 = 3_000;

    pub fn added(name: &str) -> Self {
        Self {
            message: format!("{name} added to cart!"),
            dismiss_after_ms: Self::DEFAULT_DISMISS_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub item_count: u64,
    pub subtotal: Price,
    pub subtotal_minor: u64,
    pub cart: RenderedCart,
}

#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub notification: Notification,
    pub summary: CartSummary,
}

#[derive(Debug, Serialize)]
pub struct ItemCountResponse {
    pub item_count: u64,
}
