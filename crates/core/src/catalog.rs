//! Catalog domain records.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId, ProductStatus, ReviewId, Slug, UserId};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    /// Shipping weight; optional because digital goods have none.
    pub weight: Option<Decimal>,
    pub category_id: CategoryId,
    pub brand: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product summary for listings: the record plus its rating aggregate.
///
/// Raw review rows never appear in listings, only the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub average_rating: Decimal,
    pub review_count: i64,
}

impl ProductSummary {
    /// Attach a rating aggregate to a product.
    #[must_use]
    pub const fn new(product: Product, rating: RatingSummary) -> Self {
        Self {
            product,
            average_rating: rating.average_rating,
            review_count: rating.review_count,
        }
    }
}

/// Input for creating a product.
///
/// Built by the catalog service after validation; the slug is already
/// derived from the name and the status already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub weight: Option<Decimal>,
    pub category_id: CategoryId,
    pub brand: String,
    pub status: ProductStatus,
}

/// Partial update for a product.
///
/// `None` fields are left unchanged. The slug is only present when the
/// name changed, re-derived by the catalog service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub weight: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.weight.is_none()
            && self.category_id.is_none()
            && self.brand.is_none()
            && self.status.is_none()
    }
}

/// A product review.
///
/// Reviews are written by shoppers against a product; this subsystem reads
/// them for display and aggregation but never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Star rating, 1 through 5.
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A review joined with its author's display name.
///
/// Only the display name crosses the boundary; author identity stays in
/// the identity store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    #[cfg_attr(feature = "postgres", sqlx(flatten))]
    pub review: Review,
    pub author_name: String,
}

/// Aggregated rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean of all ratings, rounded to two decimal places.
    pub average_rating: Decimal,
    pub review_count: i64,
}

impl RatingSummary {
    /// Summary for a product with no reviews.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            average_rating: Decimal::ZERO,
            review_count: 0,
        }
    }

    /// Aggregate a set of star ratings.
    ///
    /// The average rounds to two decimal places, midpoint away from zero,
    /// matching `round(avg(rating), 2)` on the storage side. No ratings
    /// yields an average of zero, not an absent value.
    #[must_use]
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::empty();
        }

        #[allow(clippy::cast_possible_wrap)] // review counts never approach i64::MAX
        let count = ratings.len() as i64;
        let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        let average = (Decimal::from(sum) / Decimal::from(count))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Self {
            average_rating: average,
            review_count: count,
        }
    }
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self::empty()
    }
}
