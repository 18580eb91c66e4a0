use std::collections::{HashMap, HashSet};

use shared::{
    domain::{FilterSpec, Product, ProductId, SortKey},
    protocol::CatalogPage,
};
use thiserror::Error;
use tracing::debug;

mod fixture;

pub use fixture::CATEGORIES;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
    #[error("product id must be positive, got {0}")]
    NonPositiveId(ProductId),
}

/// Immutable product set for one storefront session.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if product.id.0 <= 0 {
                return Err(CatalogError::NonPositiveId(product.id));
            }
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
        }
        Ok(Self::indexed(products))
    }

    pub fn fixture() -> Self {
        Self::indexed(fixture::products())
    }

    fn indexed(products: Vec<Product>) -> Self {
        let index = products
            .iter()
            .enumerate()
            .map(|(pos, product)| (product.id, pos))
            .collect();
        Self { products, index }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        &CATEGORIES
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).map(|pos| &self.products[*pos])
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Filters by category then price, sorts stably, and cuts out the 1-based `page`.
    ///
    /// Out-of-range pages come back empty; the caller owns clamping.
    pub fn query(&self, filters: &FilterSpec, page: usize, page_size: usize) -> CatalogPage {
        let mut matched: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| filters.admits(product))
            .collect();

        // slice::sort_by is stable, ties keep catalog order.
        match filters.sort_by {
            SortKey::SalesDesc => matched.sort_by(|a, b| b.sales.cmp(&a.sales)),
            SortKey::PriceAsc => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortKey::PriceDesc => matched.sort_by(|a, b| b.price.cmp(&a.price)),
        }

        let total_count = matched.len();
        let items = page_window(total_count, page, page_size)
            .map(|(start, end)| matched[start..end].iter().map(|p| (*p).clone()).collect())
            .unwrap_or_default();

        debug!(
            category = filters.category.label(),
            low = filters.price_range.low,
            high = filters.price_range.high,
            sort = %filters.sort_by,
            page,
            total_count,
            "catalog query"
        );

        CatalogPage {
            items,
            total_count,
            page,
            page_size,
        }
    }
}

fn page_window(total: usize, page: usize, page_size: usize) -> Option<(usize, usize)> {
    let start = page.checked_sub(1)?.checked_mul(page_size)?;
    if page_size == 0 || start >= total {
        return None;
    }
    let end = start.saturating_add(page_size).min(total);
    Some((start, end))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
