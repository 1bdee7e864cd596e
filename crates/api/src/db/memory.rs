//! In-memory stores for tests and local tooling.
//!
//! Both stores hand out IDs sequentially from 1 and mirror the constraint
//! behavior of the Postgres implementations, including unique slugs and
//! emails and review cleanup on product delete.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use greenstem_core::catalog::{
    NewProduct, Product, ProductPatch, RatingSummary, Review, ReviewWithAuthor,
};
use greenstem_core::filter::{ProductFilter, ProductOrder};
use greenstem_core::identity::{NewUser, User};
use greenstem_core::page::PageWindow;
use greenstem_core::store::{CatalogStore, IdentityStore, StoreError};
use greenstem_core::types::{
    CategoryId, Email, ProductId, ProductStatus, ReviewId, Slug, UserId,
};

#[derive(Default)]
struct CatalogState {
    products: Vec<Product>,
    reviews: Vec<ReviewWithAuthor>,
    next_product_id: i32,
    next_review_id: i32,
}

/// Catalog store held entirely in memory.
#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<CatalogState>,
}

impl MemoryCatalogStore {
    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a review to a product on behalf of a synthetic author.
    ///
    /// Review writing is out of scope for the API itself, so tests seed
    /// review rows directly.
    pub fn seed_review(&self, product_id: ProductId, rating: i32, title: &str, author_name: &str) {
        let mut state = self.lock();
        state.next_review_id += 1;
        let review = Review {
            id: ReviewId::new(state.next_review_id),
            product_id,
            user_id: UserId::new(state.next_review_id),
            rating,
            title: Some(title.to_owned()),
            comment: None,
            created_at: Utc::now(),
        };
        state.reviews.push(ReviewWithAuthor {
            review,
            author_name: author_name.to_owned(),
        });
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn fetch_page(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
        window: PageWindow,
    ) -> Result<Vec<Product>, StoreError> {
        let state = self.lock();
        let mut matched: Vec<Product> = state
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matched.sort_by(|a, b| order.compare(a, b));

        let offset = usize::try_from(window.offset()).unwrap_or(0);
        let limit = usize::try_from(window.limit()).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, StoreError> {
        let state = self.lock();
        let total = state.products.iter().filter(|p| filter.matches(p)).count();
        Ok(i64::try_from(total).unwrap_or(i64::MAX))
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &Slug) -> Result<Option<Product>, StoreError> {
        Ok(self
            .lock()
            .products
            .iter()
            .find(|p| p.slug == *slug)
            .cloned())
    }

    async fn slug_exists(
        &self,
        slug: &Slug,
        exclude: Option<ProductId>,
    ) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .products
            .iter()
            .any(|p| p.slug == *slug && exclude != Some(p.id)))
    }

    async fn related(
        &self,
        category: &CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<Product>, StoreError> {
        let state = self.lock();
        let mut related: Vec<Product> = state
            .products
            .iter()
            .filter(|p| {
                p.category_id == *category && p.id != exclude && p.status == ProductStatus::Active
            })
            .cloned()
            .collect();
        related.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        related.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(related)
    }

    async fn reviews_for(&self, product: ProductId) -> Result<Vec<ReviewWithAuthor>, StoreError> {
        let state = self.lock();
        let mut reviews: Vec<ReviewWithAuthor> = state
            .reviews
            .iter()
            .filter(|r| r.review.product_id == product)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.review
                .created_at
                .cmp(&a.review.created_at)
                .then(b.review.id.cmp(&a.review.id))
        });
        Ok(reviews)
    }

    async fn rating_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, RatingSummary>, StoreError> {
        let state = self.lock();
        let mut summaries = HashMap::new();
        for &id in ids {
            let ratings: Vec<i32> = state
                .reviews
                .iter()
                .filter(|r| r.review.product_id == id)
                .map(|r| r.review.rating)
                .collect();
            if !ratings.is_empty() {
                summaries.insert(id, RatingSummary::from_ratings(&ratings));
            }
        }
        Ok(summaries)
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut state = self.lock();
        if state.products.iter().any(|p| p.slug == product.slug) {
            return Err(StoreError::Conflict("slug already exists".to_owned()));
        }

        state.next_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(state.next_product_id),
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: product.price,
            stock: product.stock,
            weight: product.weight,
            category_id: product.category_id,
            brand: product.brand,
            status: product.status,
            created_at: now,
            updated_at: now,
        };
        state.products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, patch: &ProductPatch) -> Result<Product, StoreError> {
        let mut state = self.lock();
        if let Some(slug) = &patch.slug
            && state.products.iter().any(|p| p.slug == *slug && p.id != id)
        {
            return Err(StoreError::Conflict("slug already exists".to_owned()));
        }

        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = &patch.name {
            product.name.clone_from(name);
        }
        if let Some(slug) = &patch.slug {
            product.slug.clone_from(slug);
        }
        if let Some(description) = &patch.description {
            product.description.clone_from(description);
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(weight) = patch.weight {
            product.weight = Some(weight);
        }
        if let Some(category_id) = &patch.category_id {
            product.category_id.clone_from(category_id);
        }
        if let Some(brand) = &patch.brand {
            product.brand.clone_from(brand);
        }
        if let Some(status) = patch.status {
            product.status = status;
        }
        product.updated_at = Utc::now();

        Ok(product.clone())
    }

    async fn set_status(
        &self,
        id: ProductId,
        status: ProductStatus,
    ) -> Result<Product, StoreError> {
        let mut state = self.lock();
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound)?;
        product.status = status;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut state = self.lock();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        let deleted = state.products.len() < before;
        if deleted {
            state.reviews.retain(|r| r.review.product_id != id);
        }
        Ok(deleted)
    }
}

#[derive(Default)]
struct IdentityState {
    users: Vec<User>,
    next_id: i32,
}

/// Identity store held entirely in memory.
#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<IdentityState>,
}

impl MemoryIdentityStore {
    fn lock(&self) -> MutexGuard<'_, IdentityState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deactivate an account.
    ///
    /// Account administration is handled outside this API, so tests flip
    /// the flag directly.
    pub fn deactivate(&self, id: UserId) {
        let mut state = self.lock();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.is_active = false;
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.email == *email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.lock();
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        state.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: UserId::new(state.next_id),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: UserId) -> Result<(), StoreError> {
        let mut state = self.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.last_login_at = Some(Utc::now());
        user.updated_at = Utc::now();
        Ok(())
    }
}
