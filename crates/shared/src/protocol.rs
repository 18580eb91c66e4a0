use serde::{Deserialize, Serialize};

use crate::{
    domain::{FilterSpec, Product},
    error::ApiError,
};

/// One page of the filtered, sorted catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<Product>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

impl CatalogPage {
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub line_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub total_items: u64,
    pub total_price: u64,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// State changes pushed to whatever renders the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StoreEvent {
    FiltersChanged { filters: FilterSpec },
    CatalogUpdated { page: CatalogPage },
    CartUpdated { cart: CartSnapshot },
    PendingChanged { candidate: Option<Product> },
    Notice(Notice),
    Error(ApiError),
    SessionEnded { username: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = CatalogPage {
            items: Vec::new(),
            total_count: 13,
            page: 1,
            page_size: 6,
        };
        assert_eq!(page.total_pages(), 3);

        let exact = CatalogPage {
            total_count: 12,
            ..page.clone()
        };
        assert_eq!(exact.total_pages(), 2);

        let degenerate = CatalogPage { page_size: 0, ..page };
        assert_eq!(degenerate.total_pages(), 0);
    }

    #[test]
    fn events_are_tagged_on_the_wire() {
        let event = StoreEvent::Notice(Notice::success("ok"));
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "notice");
        assert_eq!(json["payload"]["level"], "success");
    }
}
