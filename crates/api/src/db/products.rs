//! Postgres-backed catalog store.
//!
//! Listing queries are assembled with `QueryBuilder` because the filter,
//! sort, and page window are decided per request. Sort columns come from a
//! fixed whitelist; every user-supplied value is bound, never interpolated.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use greenstem_core::catalog::{NewProduct, Product, ProductPatch, RatingSummary, ReviewWithAuthor};
use greenstem_core::filter::{Predicate, ProductFilter, ProductOrder, SortKey, SortOrder};
use greenstem_core::page::PageWindow;
use greenstem_core::store::{CatalogStore, StoreError};
use greenstem_core::types::{CategoryId, ProductId, ProductStatus, Slug};

/// Catalog store backed by the `store.product` and `store.review` tables.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new catalog store on top of a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn fetch_page(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, name, slug, description, price, stock, weight, \
             category_id, brand, status, created_at, updated_at \
             FROM store.product",
        );
        push_predicates(&mut query, filter);

        query
            .push(" ORDER BY ")
            .push(sort_column(order.key))
            .push(" ")
            .push(sort_direction(order.order))
            .push(", id ASC");
        query
            .push(" LIMIT ")
            .push_bind(i64::from(window.limit()))
            .push(" OFFSET ")
            .push_bind(window.offset());

        let products = query
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, StoreError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT count(*) FROM store.product");
        push_predicates(&mut query, filter);

        let total: i64 = query.build_query_scalar().fetch_one(&self.pool).await?;

        Ok(total)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, slug, description, price, stock, weight, \
             category_id, brand, status, created_at, updated_at \
             FROM store.product \
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, slug, description, price, stock, weight, \
             category_id, brand, status, created_at, updated_at \
             FROM store.product \
             WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn slug_exists(
        &self,
        slug: &Slug,
        exclude: Option<ProductId>,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
               SELECT 1 FROM store.product \
               WHERE slug = $1 AND ($2 IS NULL OR id <> $2) \
             )",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn related(
        &self,
        category: &CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, slug, description, price, stock, weight, \
             category_id, brand, status, created_at, updated_at \
             FROM store.product \
             WHERE category_id = $1 AND id <> $2 AND status = 'active' \
             ORDER BY created_at DESC, id ASC \
             LIMIT $3",
        )
        .bind(category)
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn reviews_for(&self, product: ProductId) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.id, r.product_id, r.user_id, r.rating, r.title, r.comment, \
                    r.created_at, u.name AS author_name \
             FROM store.review r \
             JOIN store.user u ON u.id = r.user_id \
             WHERE r.product_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(product)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn rating_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, RatingSummary>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, RatingRow>(
            "SELECT product_id, \
                    round(avg(rating), 2) AS average_rating, \
                    count(*) AS review_count \
             FROM store.review \
             WHERE product_id = ANY($1) \
             GROUP BY product_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RatingRow::into_pair).collect())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(
            "INSERT INTO store.product \
               (name, slug, description, price, stock, weight, category_id, brand, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, name, slug, description, price, stock, weight, \
                       category_id, brand, status, created_at, updated_at",
        )
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.weight)
        .bind(product.category_id)
        .bind(product.brand)
        .bind(product.status)
        .fetch_one(&self.pool)
        .await
        .map_err(slug_unique_violation)
    }

    async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, StoreError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("UPDATE store.product SET updated_at = now()");

        if let Some(name) = &patch.name {
            query.push(", name = ").push_bind(name);
        }
        if let Some(slug) = &patch.slug {
            query.push(", slug = ").push_bind(slug);
        }
        if let Some(description) = &patch.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(price) = patch.price {
            query.push(", price = ").push_bind(price);
        }
        if let Some(stock) = patch.stock {
            query.push(", stock = ").push_bind(stock);
        }
        if let Some(weight) = patch.weight {
            query.push(", weight = ").push_bind(weight);
        }
        if let Some(category_id) = &patch.category_id {
            query.push(", category_id = ").push_bind(category_id);
        }
        if let Some(brand) = &patch.brand {
            query.push(", brand = ").push_bind(brand);
        }
        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(status);
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(
            " RETURNING id, name, slug, description, price, stock, weight, \
              category_id, brand, status, created_at, updated_at",
        );

        query
            .build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await
            .map_err(slug_unique_violation)?
            .ok_or(StoreError::NotFound)
    }

    async fn set_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<Product, StoreError> {
        sqlx::query_as::<_, Product>(
            "UPDATE store.product \
             SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, slug, description, price, stock, weight, \
                       category_id, brand, status, created_at, updated_at",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        // Reviews go with the product via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM store.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// One row of the review aggregation query.
#[derive(sqlx::FromRow)]
struct RatingRow {
    product_id: ProductId,
    average_rating: rust_decimal::Decimal,
    review_count: i64,
}

impl RatingRow {
    fn into_pair(self) -> (ProductId, RatingSummary) {
        (
            self.product_id,
            RatingSummary {
                average_rating: self.average_rating,
                review_count: self.review_count,
            },
        )
    }
}

/// Append `WHERE ...` for every predicate in the filter, AND-joined.
fn push_predicates<'args>(query: &mut QueryBuilder<'args, Postgres>, filter: &'args ProductFilter) {
    if filter.predicates().is_empty() {
        return;
    }

    query.push(" WHERE ");
    let mut clauses = query.separated(" AND ");
    for predicate in filter.predicates() {
        match predicate {
            Predicate::Status(status) => {
                clauses.push("status = ").push_bind_unseparated(*status);
            }
            Predicate::Category(category) => {
                clauses.push("category_id = ").push_bind_unseparated(category);
            }
            Predicate::Brand(brand) => {
                clauses.push("brand = ").push_bind_unseparated(brand);
            }
            Predicate::MinPrice(min) => {
                clauses.push("price >= ").push_bind_unseparated(*min);
            }
            Predicate::MaxPrice(max) => {
                clauses.push("price <= ").push_bind_unseparated(*max);
            }
            Predicate::Search(term) => {
                let pattern = format!("%{}%", escape_like(term));
                clauses
                    .push("(name ILIKE ")
                    .push_bind_unseparated(pattern.clone())
                    .push_unseparated(" OR description ILIKE ")
                    .push_bind_unseparated(pattern)
                    .push_unseparated(")");
            }
        }
    }
}

/// Whitelisted sort column for a sort key.
const fn sort_column(key: SortKey) -> &'static str {
    match key {
        SortKey::Name => "lower(name)",
        SortKey::Price => "price",
        SortKey::Stock => "stock",
        SortKey::CreatedAt => "created_at",
    }
}

const fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// Escape `%`, `_`, and `\` so a search term matches literally inside LIKE.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Map a unique-constraint violation on the slug to a conflict.
fn slug_unique_violation(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict("slug already exists".to_string());
    }
    StoreError::Database(e)
}
