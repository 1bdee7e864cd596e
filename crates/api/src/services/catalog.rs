//! Catalog query and management service.
//!
//! Listing, lookup, and admin mutations over a [`CatalogStore`]. Query
//! parameters arrive as loose strings and numbers; this service turns them
//! into typed filter predicates, sort orders, and page windows before
//! touching storage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use greenstem_core::catalog::{
    NewProduct, Product, ProductPatch, ProductSummary, RatingSummary, ReviewWithAuthor,
};
use greenstem_core::filter::{Predicate, ProductFilter, ProductOrder};
use greenstem_core::page::{Page, PageWindow};
use greenstem_core::store::{CatalogStore, StoreError};
use greenstem_core::types::{CategoryId, ProductId, ProductStatus, Slug, StatusSelector};

use crate::error::ApiError;

/// Maximum number of related products attached to a detail lookup.
const RELATED_LIMIT: i64 = 4;

/// Query parameters accepted by the catalog listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category_id: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub status: Option<String>,
}

/// Input for creating a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default)]
    pub weight: Option<Decimal>,
    pub category_id: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

/// Partial update for a product; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub weight: Option<Decimal>,
    pub category_id: Option<String>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
}

/// Full product detail: the product with its rating aggregate, all reviews,
/// and a handful of related products from the same category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub reviews: Vec<ReviewWithAuthor>,
    pub related_products: Vec<ProductSummary>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// List products with filtering, sorting, and pagination.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for an unknown status, sort key, or
    /// sort order.
    pub async fn list(&self, params: ListParams) -> Result<Page<ProductSummary>, ApiError> {
        let filter = build_filter(&params)?;
        let order = ProductOrder::parse(params.sort_by.as_deref(), params.sort_order.as_deref())
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        let window = PageWindow::new(params.page, params.limit);

        let total = self.store.count(&filter).await?;
        let products = self.store.fetch_page(&filter, order, window).await?;
        let items = self.with_ratings(products).await?;

        Ok(Page::new(items, window, total))
    }

    /// Fetch one product by numeric ID or slug, with reviews and related
    /// products. Lookup ignores status, so inactive products resolve too.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if neither key matches.
    pub async fn get(&self, key: &str) -> Result<ProductDetail, ApiError> {
        let product = self
            .lookup(key)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        let reviews = self.store.reviews_for(product.id).await?;
        let ratings: Vec<i32> = reviews.iter().map(|r| r.review.rating).collect();
        let rating = RatingSummary::from_ratings(&ratings);

        let related = self
            .store
            .related(&product.category_id, product.id, RELATED_LIMIT)
            .await?;
        let related_products = self.with_ratings(related).await?;

        Ok(ProductDetail {
            summary: ProductSummary::new(product, rating),
            reviews,
            related_products,
        })
    }

    /// Create a product. The slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for bad field values and
    /// `ApiError::Conflict` if the derived slug is already taken.
    pub async fn create(&self, input: ProductInput) -> Result<ProductSummary, ApiError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Name must not be empty".to_string()));
        }
        validate_non_negative("price", input.price)?;
        validate_non_negative_count("stock", input.stock)?;
        if let Some(weight) = input.weight {
            validate_non_negative("weight", weight)?;
        }
        let category_id = input.category_id.trim();
        if category_id.is_empty() {
            return Err(ApiError::Validation(
                "categoryId must not be empty".to_string(),
            ));
        }

        let slug = Slug::derive(name).map_err(|e| ApiError::Validation(e.to_string()))?;
        if self.store.slug_exists(&slug, None).await? {
            return Err(slug_taken());
        }

        let product = self
            .store
            .insert(NewProduct {
                name: name.to_string(),
                slug,
                description: input.description.unwrap_or_default(),
                price: input.price,
                stock: input.stock,
                weight: input.weight,
                category_id: CategoryId::new(category_id),
                brand: input.brand.unwrap_or_default(),
                status: input.status.unwrap_or_default(),
            })
            .await
            .map_err(slug_conflict)?;

        Ok(ProductSummary::new(product, RatingSummary::empty()))
    }

    /// Update a product. Changing the name re-derives the slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product doesn't exist,
    /// `ApiError::Validation` for bad field values, and `ApiError::Conflict`
    /// if a re-derived slug collides with another product.
    pub async fn update(&self, id: ProductId, input: ProductUpdate) -> Result<Product, ApiError> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        let mut patch = ProductPatch::default();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::Validation("Name must not be empty".to_string()));
            }
            if name != current.name {
                let slug = Slug::derive(&name).map_err(|e| ApiError::Validation(e.to_string()))?;
                if self.store.slug_exists(&slug, Some(id)).await? {
                    return Err(slug_taken());
                }
                patch.slug = Some(slug);
            }
            patch.name = Some(name);
        }
        if let Some(description) = input.description {
            patch.description = Some(description);
        }
        if let Some(price) = input.price {
            validate_non_negative("price", price)?;
            patch.price = Some(price);
        }
        if let Some(stock) = input.stock {
            validate_non_negative_count("stock", stock)?;
            patch.stock = Some(stock);
        }
        if let Some(weight) = input.weight {
            validate_non_negative("weight", weight)?;
            patch.weight = Some(weight);
        }
        if let Some(category_id) = input.category_id {
            let trimmed = category_id.trim();
            if trimmed.is_empty() {
                return Err(ApiError::Validation(
                    "categoryId must not be empty".to_string(),
                ));
            }
            patch.category_id = Some(CategoryId::new(trimmed));
        }
        if let Some(brand) = input.brand {
            patch.brand = Some(brand);
        }
        if let Some(status) = input.status {
            patch.status = Some(status);
        }

        if patch.is_empty() {
            return Ok(current);
        }

        self.store.update(id, &patch).await.map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("Product not found".to_string()),
            other => slug_conflict(other),
        })
    }

    /// Flip a product between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product doesn't exist.
    pub async fn toggle_status(&self, id: ProductId) -> Result<Product, ApiError> {
        let product = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        self.store
            .set_status(id, product.status.toggled())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => ApiError::NotFound("Product not found".to_string()),
                other => ApiError::Store(other),
            })
    }

    /// Delete a product and its reviews.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Product not found".to_string()))
        }
    }

    /// Resolve a path key as a numeric ID first, then as a slug.
    async fn lookup(&self, key: &str) -> Result<Option<Product>, StoreError> {
        if let Ok(id) = key.parse::<i32>() {
            if let Some(product) = self.store.find_by_id(ProductId::new(id)).await? {
                return Ok(Some(product));
            }
        }
        match Slug::parse(key) {
            Ok(slug) => self.store.find_by_slug(&slug).await,
            Err(_) => Ok(None),
        }
    }

    /// Attach rating aggregates to a batch of products in one store call.
    async fn with_ratings(&self, products: Vec<Product>) -> Result<Vec<ProductSummary>, ApiError> {
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
        let ratings = self.store.rating_summaries(&ids).await?;

        Ok(products
            .into_iter()
            .map(|product| {
                let rating = ratings.get(&product.id).copied().unwrap_or_default();
                ProductSummary::new(product, rating)
            })
            .collect())
    }
}

/// Build a typed filter from loose listing parameters.
fn build_filter(params: &ListParams) -> Result<ProductFilter, ApiError> {
    let mut filter = ProductFilter::new();

    let selector = match params.status.as_deref().map(str::trim) {
        None | Some("") => StatusSelector::default(),
        Some(raw) => raw
            .to_lowercase()
            .parse::<StatusSelector>()
            .map_err(ApiError::Validation)?,
    };
    if let StatusSelector::One(status) = selector {
        filter = filter.with(Predicate::Status(status));
    }

    if let Some(category) = trimmed(params.category_id.as_deref()) {
        filter = filter.with(Predicate::Category(CategoryId::new(category)));
    }
    if let Some(brand) = trimmed(params.brand.as_deref()) {
        filter = filter.with(Predicate::Brand(brand.to_string()));
    }
    if let Some(min) = params.min_price {
        filter = filter.with(Predicate::MinPrice(min));
    }
    if let Some(max) = params.max_price {
        filter = filter.with(Predicate::MaxPrice(max));
    }
    if let Some(term) = trimmed(params.search.as_deref()) {
        filter = filter.with(Predicate::Search(term.to_string()));
    }

    Ok(filter)
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn validate_non_negative(field: &str, value: Decimal) -> Result<(), ApiError> {
    if value < Decimal::ZERO {
        return Err(ApiError::Validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

fn validate_non_negative_count(field: &str, value: i32) -> Result<(), ApiError> {
    if value < 0 {
        return Err(ApiError::Validation(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

fn slug_taken() -> ApiError {
    ApiError::Conflict("A product with this slug already exists".to_string())
}

fn slug_conflict(err: StoreError) -> ApiError {
    match err {
        StoreError::Conflict(_) => slug_taken(),
        other => ApiError::Store(other),
    }
}
