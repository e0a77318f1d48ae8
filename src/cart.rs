use crate::errors::CartError;
use crate::models::{CartLine, CartSummary, LineItem, Notification, Product, RenderedCart};
use crate::price::Price;
use crate::storage::{Storage, CART_KEY};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

pub struct CartStore<S> {
    storage: S,
    items: Vec<LineItem>,
}

impl<S: Storage> CartStore<S> {
    pub fn load(storage: S) -> Self {
        let items = match storage.get_item(CART_KEY) {
            Ok(Some(raw)) => match decode_items(&raw) {
                Ok(items) => items,
                Err(err) => {
                    warn!("resetting cart: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                error!("failed to read stored cart: {err}");
                Vec::new()
            }
        };
        info!(lines = items.len(), "cart loaded");
        Self { storage, items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_item(&mut self, product: Product) -> Result<Notification, CartError> {
        let mut next = self.items.clone();
        match next.iter_mut().find(|item| item.name == product.name) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(1)
                    .ok_or_else(|| CartError::QuantityLimit(product.name.clone()))?;
            }
            None => next.push(LineItem {
                name: product.name.clone(),
                unit_price: product.unit_price,
                image: product.image,
                quantity: 1,
            }),
        }

        self.commit(next)?;
        info!(name = %product.name, item_count = self.item_count(), "item added");
        Ok(Notification::added(&product.name))
    }

    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, CartError> {
        let len = self.items.len();
        if index >= len {
            return Err(CartError::InvalidIndex { index, len });
        }

        let mut next = self.items.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        info!(name = %removed.name, index, "line removed");
        Ok(removed)
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .map(|item| item.unit_price.times(item.quantity))
            .sum()
    }

    pub fn render(&self) -> RenderedCart {
        if self.items.is_empty() {
            return RenderedCart::Empty;
        }

        RenderedCart::Populated(
            self.items
                .iter()
                .enumerate()
                .map(|(index, item)| CartLine {
                    index,
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    line_total: item.unit_price.times(item.quantity),
                    image: item.image.clone(),
                })
                .collect(),
        )
    }

    pub fn summary(&self) -> CartSummary {
        let subtotal = self.subtotal();
        CartSummary {
            item_count: self.item_count(),
            subtotal,
            subtotal_minor: subtotal.minor_units(),
            cart: self.render(),
        }
    }

    // Persist first; the in-memory list only changes once storage accepted it.
    fn commit(&mut self, next: Vec<LineItem>) -> Result<(), CartError> {
        let payload = serde_json::to_string(&next)
            .map_err(|err| CartError::Storage(std::io::Error::other(err)))?;
        if let Err(err) = self.storage.set_item(CART_KEY, &payload) {
            error!("failed to persist cart: {err}");
            return Err(err.into());
        }
        debug!(bytes = payload.len(), "cart persisted");
        self.items = next;
        Ok(())
    }
}

fn decode_items(raw: &str) -> Result<Vec<LineItem>, CartError> {
    let items: Vec<LineItem> =
        serde_json::from_str(raw).map_err(|err| CartError::MalformedStorage(err.to_string()))?;
    check_invariants(&items)?;
    Ok(items)
}

fn check_invariants(items: &[LineItem]) -> Result<(), CartError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(CartError::MalformedStorage(format!(
                "{:?} has zero quantity",
                item.name
            )));
        }
        if !seen.insert(item.name.as_str()) {
            return Err(CartError::MalformedStorage(format!(
                "{:?} appears more than once",
                item.name
            )));
        }
    }
    Ok(())
}
