//! Catalog filter and ordering builders.
//!
//! Listing parameters are compiled into a [`ProductFilter`] (a conjunction
//! of typed predicates) and a [`ProductOrder`] (a whitelisted sort key and
//! direction) before they reach storage. Unknown predicates and sort keys
//! cannot be represented, so injection through listing parameters is ruled
//! out by construction.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::catalog::Product;
use crate::types::{CategoryId, ProductStatus};

/// A single filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Product status equals the given status.
    Status(ProductStatus),
    /// Product belongs to the given category.
    Category(CategoryId),
    /// Product brand equals the given brand exactly.
    Brand(String),
    /// Product price is at least the given amount.
    MinPrice(Decimal),
    /// Product price is at most the given amount.
    MaxPrice(Decimal),
    /// Case-insensitive substring match on name or description.
    Search(String),
}

impl Predicate {
    /// Returns `true` if the product satisfies this predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::Status(status) => product.status == *status,
            Self::Category(category) => product.category_id == *category,
            Self::Brand(brand) => product.brand == *brand,
            Self::MinPrice(min) => product.price >= *min,
            Self::MaxPrice(max) => product.price <= *max,
            Self::Search(needle) => {
                let needle = needle.to_lowercase();
                product.name.to_lowercase().contains(&needle)
                    || product.description.to_lowercase().contains(&needle)
            }
        }
    }
}

/// A conjunction of predicates: a product matches when every predicate holds.
///
/// An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    predicates: Vec<Predicate>,
}

impl ProductFilter {
    /// Create an empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Add a predicate to the conjunction.
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// The predicates in this filter.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns `true` if the product satisfies every predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.predicates.iter().all(|p| p.matches(product))
    }
}

/// Errors from parsing listing sort parameters.
#[derive(Debug, Clone, Error)]
pub enum SortError {
    /// The sort key is not one of the whitelisted keys.
    #[error("unknown sortBy '{0}': expected one of name, price, stock, sales, createdAt")]
    UnknownKey(String),
    /// The sort direction is not `asc` or `desc`.
    #[error("unknown sortOrder '{0}': expected asc or desc")]
    UnknownOrder(String),
}

/// Whitelisted sort keys for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Name,
    Price,
    Stock,
    /// Recency; also selected by the `sales` alias.
    #[default]
    CreatedAt,
}

impl std::str::FromStr for SortKey {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            // `sales` is a legacy alias for recency ordering
            "sales" | "createdAt" => Ok(Self::CreatedAt),
            other => Err(SortError::UnknownKey(other.to_owned())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(SortError::UnknownOrder(other.to_owned())),
        }
    }
}

/// A complete ordering for a catalog listing.
///
/// Defaults to newest-first. Ties break on id so page windows stay stable
/// across requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductOrder {
    pub key: SortKey,
    pub order: SortOrder,
}

impl ProductOrder {
    /// Parse `sortBy`/`sortOrder` listing parameters.
    ///
    /// Absent parameters fall back to the defaults (`createdAt`, `desc`).
    ///
    /// # Errors
    ///
    /// Returns `SortError` if either parameter is present but not in the
    /// whitelist.
    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<Self, SortError> {
        let key = sort_by.map_or(Ok(SortKey::default()), str::parse)?;
        let order = sort_order.map_or(Ok(SortOrder::default()), str::parse)?;
        Ok(Self { key, order })
    }

    /// Compare two products under this ordering.
    #[must_use]
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let forward = match self.key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Stock => a.stock.cmp(&b.stock),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        };

        let directed = match self.order {
            SortOrder::Asc => forward,
            SortOrder::Desc => forward.reverse(),
        };

        directed.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{ProductId, Slug};

    fn product(id: i32, name: &str, price: i64, status: ProductStatus) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            slug: Slug::derive(name).unwrap(),
            description: format!("{name} description"),
            price: Decimal::from(price),
            stock: 10,
            weight: None,
            category_id: CategoryId::new("c1"),
            brand: "Acme".to_owned(),
            status,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, id as u32 % 60).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, id as u32 % 60).unwrap(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let p = product(1, "Widget", 10, ProductStatus::Active);
        assert!(ProductFilter::new().matches(&p));
    }

    #[test]
    fn test_conjunction_requires_all_predicates() {
        let p = product(1, "Noise Machine", 50, ProductStatus::Active);

        let filter = ProductFilter::new()
            .with(Predicate::Status(ProductStatus::Active))
            .with(Predicate::MinPrice(Decimal::from(20)))
            .with(Predicate::MaxPrice(Decimal::from(80)));
        assert!(filter.matches(&p));

        let narrowed = filter.with(Predicate::Brand("OtherBrand".to_owned()));
        assert!(!narrowed.matches(&p));
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let p = product(1, "Espresso Grinder", 120, ProductStatus::Active);

        let by_name = ProductFilter::new().with(Predicate::Search("ESPRESSO".to_owned()));
        assert!(by_name.matches(&p));

        let by_description = ProductFilter::new().with(Predicate::Search("DESCRIPTION".to_owned()));
        assert!(by_description.matches(&p));

        let miss = ProductFilter::new().with(Predicate::Search("teapot".to_owned()));
        assert!(!miss.matches(&p));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let p = product(1, "Widget", 50, ProductStatus::Active);
        assert!(Predicate::MinPrice(Decimal::from(50)).matches(&p));
        assert!(Predicate::MaxPrice(Decimal::from(50)).matches(&p));
        assert!(!Predicate::MinPrice(Decimal::from(51)).matches(&p));
        assert!(!Predicate::MaxPrice(Decimal::from(49)).matches(&p));
    }

    #[test]
    fn test_sort_key_whitelist() {
        assert_eq!("name".parse::<SortKey>().unwrap(), SortKey::Name);
        assert_eq!("price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert_eq!("stock".parse::<SortKey>().unwrap(), SortKey::Stock);
        assert_eq!("createdAt".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
    }

    #[test]
    fn test_sales_aliases_recency() {
        assert_eq!("sales".parse::<SortKey>().unwrap(), SortKey::CreatedAt);
    }

    #[test]
    fn test_unknown_sort_key_rejected() {
        let err = "rating; DROP TABLE".parse::<SortKey>().unwrap_err();
        assert!(matches!(err, SortError::UnknownKey(_)));
    }

    #[test]
    fn test_order_parse_defaults() {
        let order = ProductOrder::parse(None, None).unwrap();
        assert_eq!(order.key, SortKey::CreatedAt);
        assert_eq!(order.order, SortOrder::Desc);
    }

    #[test]
    fn test_order_parse_rejects_unknown_direction() {
        let err = ProductOrder::parse(Some("price"), Some("sideways")).unwrap_err();
        assert!(matches!(err, SortError::UnknownOrder(_)));
    }

    #[test]
    fn test_compare_by_price_desc_with_id_tiebreak() {
        let cheap = product(1, "A", 10, ProductStatus::Active);
        let dear = product(2, "B", 90, ProductStatus::Active);
        let dear_twin = product(3, "C", 90, ProductStatus::Active);

        let order = ProductOrder {
            key: SortKey::Price,
            order: SortOrder::Desc,
        };
        assert_eq!(order.compare(&dear, &cheap), Ordering::Less);
        assert_eq!(order.compare(&cheap, &dear), Ordering::Greater);
        // Equal prices fall back to id, keeping the ordering total
        assert_eq!(order.compare(&dear, &dear_twin), Ordering::Less);
    }

    #[test]
    fn test_compare_name_is_case_insensitive() {
        let lower = product(1, "anvil", 10, ProductStatus::Active);
        let upper = product(2, "Bellows", 10, ProductStatus::Active);

        let order = ProductOrder {
            key: SortKey::Name,
            order: SortOrder::Asc,
        };
        assert_eq!(order.compare(&lower, &upper), Ordering::Less);
    }
}
