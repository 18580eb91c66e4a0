//! Product-to-quantity ledger behind the cart drawer.

use std::sync::Arc;

use catalog::Catalog;
use shared::{
    domain::{Product, ProductId},
    protocol::{CartLine, CartSnapshot},
};
use tracing::debug;

use crate::error::CartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEntry {
    pub product_id: ProductId,
    /// Always at least 1; an entry dropping to zero is removed.
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Updated { quantity: u32 },
    Removed,
    /// The product had no entry; nothing was stored.
    Unchanged,
}

/// Entries in insertion order, at most one per product. Totals are derived on every read.
#[derive(Debug, Clone)]
pub struct CartLedger {
    catalog: Arc<Catalog>,
    entries: Vec<CartEntry>,
}

impl CartLedger {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            entries: Vec::new(),
        }
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.entries.iter().position(|e| e.product_id == product_id)
    }

    /// Bumps the product's quantity by one, inserting it at 1 when absent.
    pub fn add(&mut self, product: &Product) -> Result<u32, CartError> {
        if !self.catalog.contains(product.id) {
            return Err(CartError::UnknownProduct(product.id));
        }
        let quantity = match self.position(product.id) {
            Some(pos) => {
                let entry = &mut self.entries[pos];
                entry.quantity = entry.quantity.saturating_add(1);
                entry.quantity
            }
            None => {
                self.entries.push(CartEntry {
                    product_id: product.id,
                    quantity: 1,
                });
                1
            }
        };
        debug!(product_id = %product.id, quantity, "cart add");
        Ok(quantity)
    }

    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> QuantityChange {
        let Some(pos) = self.position(product_id) else {
            return QuantityChange::Unchanged;
        };
        if quantity <= 0 {
            self.entries.remove(pos);
            debug!(%product_id, "cart entry removed");
            return QuantityChange::Removed;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.entries[pos].quantity = quantity;
        debug!(%product_id, quantity, "cart quantity set");
        QuantityChange::Updated { quantity }
    }

    pub fn remove(&mut self, product_id: ProductId) -> QuantityChange {
        self.set_quantity(product_id, 0)
    }

    pub fn increment(&mut self, product_id: ProductId) -> QuantityChange {
        match self.quantity_of(product_id) {
            Some(current) => self.set_quantity(product_id, i64::from(current) + 1),
            None => QuantityChange::Unchanged,
        }
    }

    pub fn decrement(&mut self, product_id: ProductId) -> QuantityChange {
        match self.quantity_of(product_id) {
            Some(current) => self.set_quantity(product_id, i64::from(current) - 1),
            None => QuantityChange::Unchanged,
        }
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.position(product_id).map(|pos| self.entries[pos].quantity)
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    pub fn total_price(&self) -> Result<u64, CartError> {
        self.lines()
            .map(|lines| lines.iter().map(|line| line.line_total).sum())
    }

    pub fn lines(&self) -> Result<Vec<CartLine>, CartError> {
        self.entries
            .iter()
            .map(|entry| -> Result<CartLine, CartError> {
                let product = self
                    .catalog
                    .get(entry.product_id)
                    .ok_or(CartError::UnresolvedEntry(entry.product_id))?;
                Ok(CartLine {
                    product: product.clone(),
                    quantity: entry.quantity,
                    line_total: product.price.saturating_mul(u64::from(entry.quantity)),
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> Result<CartSnapshot, CartError> {
        let lines = self.lines()?;
        let total_price = lines.iter().map(|line| line.line_total).sum();
        Ok(CartSnapshot {
            lines,
            total_items: self.total_item_count(),
            total_price,
        })
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
