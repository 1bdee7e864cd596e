//! Storage traits for catalog and identity data.
//!
//! The query engine and auth service talk to these traits only; the API
//! crate provides the `PostgreSQL` implementation and an in-memory one
//! for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{NewProduct, Product, ProductPatch, RatingSummary, ReviewWithAuthor};
use crate::filter::{ProductFilter, ProductOrder};
use crate::identity::{NewUser, User};
use crate::page::PageWindow;
use crate::types::{CategoryId, Email, ProductId, ProductStatus, Slug, UserId};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Read and write access to products and their reviews.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch one page of products matching `filter` in `order`.
    async fn fetch_page(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError>;

    /// Count all products matching `filter`, ignoring pagination.
    async fn count(&self, filter: &ProductFilter) -> Result<i64, StoreError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Product>, StoreError>;

    /// Whether `slug` is already taken, optionally ignoring one product.
    async fn slug_exists(
        &self,
        slug: &Slug,
        exclude: Option<ProductId>,
    ) -> Result<bool, StoreError>;

    /// Other active products in `category`, excluding the product itself.
    async fn related(
        &self,
        category: &CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<Product>, StoreError>;

    /// All reviews for a product with author names, newest first.
    async fn reviews_for(&self, product: ProductId) -> Result<Vec<ReviewWithAuthor>, StoreError>;

    /// Rating summaries for a batch of products.
    ///
    /// Products without reviews are absent from the map; callers fall back
    /// to [`RatingSummary::empty`].
    async fn rating_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, RatingSummary>, StoreError>;

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Apply a patch to an existing product.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the product does not exist.
    async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, StoreError>;

    /// Set the product status directly.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the product does not exist.
    async fn set_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<Product, StoreError>;

    /// Delete a product and its reviews. Returns `false` if nothing matched.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;
}

/// Read and write access to user accounts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the email is already registered.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Stamp the account's last login time.
    async fn record_login(&self, id: UserId) -> Result<(), StoreError>;
}
