use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProductId);

/// Number of products shown per catalog page.
pub const PAGE_SIZE: usize = 6;
pub const PRICE_SLIDER_MAX: u64 = 20_000;
pub const PRICE_SLIDER_STEP: u64 = 100;

/// Label used by the catalog for the "every category" choice.
pub const ALL_CATEGORIES_LABEL: &str = "全部";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Whole currency units.
    pub price: u64,
    pub sales: u64,
    pub image: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: u64,
    pub high: u64,
}

impl PriceRange {
    pub const FULL: PriceRange = PriceRange {
        low: 0,
        high: PRICE_SLIDER_MAX,
    };

    pub fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// Inclusive on both ends. An inverted range contains nothing.
    pub fn contains(&self, price: u64) -> bool {
        self.low <= price && price <= self.high
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn only(category: impl Into<String>) -> Self {
        Self::Only(category.into())
    }

    /// Exact, case-sensitive comparison against a product's category.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES_LABEL,
            Self::Only(category) => category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw == ALL_CATEGORIES_LABEL || raw.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Only(raw.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "sales")]
    SalesDesc,
    #[serde(rename = "price_asc")]
    PriceAsc,
    #[serde(rename = "price_desc")]
    PriceDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SalesDesc => "sales",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key '{0}', expected one of: sales, price_asc, price_desc")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sales" | "sales_desc" => Ok(Self::SalesDesc),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            _ => Err(UnknownSortKey(raw.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    pub price_range: PriceRange,
    pub category: CategoryFilter,
    pub sort_by: SortKey,
}

impl FilterSpec {
    pub fn admits(&self, product: &Product) -> bool {
        self.category.matches(&product.category) && self.price_range.contains(product.price)
    }
}

/// Renders an amount as `¥12,345`.
pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    grouped.push('¥');
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_prices_with_thousands_separators() {
        assert_eq!(format_price(0), "¥0");
        assert_eq!(format_price(999), "¥999");
        assert_eq!(format_price(9999), "¥9,999");
        assert_eq!(format_price(1_234_567), "¥1,234,567");
    }

    #[test]
    fn price_range_is_inclusive_and_tolerates_inversion() {
        let range = PriceRange::new(100, 200);
        assert!(range.contains(100));
        assert!(range.contains(200));
        assert!(!range.contains(201));
        assert!(!PriceRange::new(500, 100).contains(300));
    }

    #[test]
    fn filter_admits_on_category_and_inclusive_price() {
        let product = Product {
            id: ProductId(1),
            name: "iPhone 15 Pro Max".into(),
            category: "手机".into(),
            price: 9999,
            sales: 5200,
            image: String::new(),
            description: String::new(),
        };
        let mut filters = FilterSpec::default();
        assert!(filters.admits(&product));

        filters.price_range = PriceRange::new(0, 9999);
        filters.category = CategoryFilter::only("手机");
        assert!(filters.admits(&product));

        filters.price_range = PriceRange::new(0, 9998);
        assert!(!filters.admits(&product));

        filters.price_range = PriceRange::FULL;
        filters.category = CategoryFilter::only("电脑");
        assert!(!filters.admits(&product));
    }

    #[test]
    fn parses_category_sentinel_and_sort_keys() {
        assert_eq!("全部".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "手机".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::only("手机")
        );
        assert_eq!("price_desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert!("newest".parse::<SortKey>().is_err());
    }

    #[test]
    fn sort_key_uses_form_values_on_the_wire() {
        let json = serde_json::to_string(&SortKey::SalesDesc).expect("serialize");
        assert_eq!(json, "\"sales\"");
        let filter: FilterSpec = serde_json::from_str(
            r#"{"price_range":{"low":0,"high":10000},"category":{"only":"手机"},"sort_by":"price_asc"}"#,
        )
        .expect("deserialize");
        assert_eq!(filter.sort_by, SortKey::PriceAsc);
        assert_eq!(filter.category, CategoryFilter::only("手机"));
    }
}
