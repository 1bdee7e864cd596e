//! Catalog route handlers.
//!
//! Reads are public: anonymous callers see the same listings as signed-in
//! ones, signed-in callers just get their identity attached to the request
//! trail. Mutations require the admin role via [`RequireAdmin`].

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Serialize;

use greenstem_core::catalog::{Product, ProductSummary};
use greenstem_core::page::PageMeta;
use greenstem_core::types::ProductId;

use crate::error::{ApiError, add_breadcrumb};
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::response::Envelope;
use crate::services::catalog::{
    CatalogService, ListParams, ProductDetail, ProductInput, ProductUpdate,
};
use crate::state::AppState;

/// A page of products with its pagination counters.
#[derive(Debug, Serialize)]
pub struct ProductListPayload {
    pub products: Vec<ProductSummary>,
    pub pagination: PageMeta,
}

/// A single product, in whatever shape the endpoint produces.
#[derive(Debug, Serialize)]
pub struct ProductPayload<T> {
    pub product: T,
}

/// Acknowledgement for a completed delete.
#[derive(Debug, Serialize)]
pub struct DeletedPayload {
    pub deleted: bool,
}

/// List products with filtering, sorting, and pagination.
///
/// GET /products
///
/// # Errors
///
/// Returns 400 for unparseable query parameters and for unknown status,
/// sort key, or sort order values.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Envelope<ProductListPayload>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::Validation(e.body_text()))?;

    if let Some(viewer) = &viewer {
        tracing::debug!(user_id = %viewer.id, "Catalog listing for signed-in user");
    }

    let page = CatalogService::new(state.catalog()).list(params).await?;
    let pagination = page.meta();

    Ok(Envelope::new(ProductListPayload {
        products: page.items,
        pagination,
    }))
}

/// Fetch one product by numeric ID or slug.
///
/// GET /products/{idOrSlug}
///
/// # Errors
///
/// Returns 404 if neither key matches.
pub async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Envelope<ProductPayload<ProductDetail>>, ApiError> {
    let detail = CatalogService::new(state.catalog()).get(&key).await?;

    Ok(Envelope::new(ProductPayload { product: detail }))
}

/// Create a product.
///
/// POST /products (admin)
///
/// # Errors
///
/// Returns 400 for invalid fields, 409 if the derived slug is taken.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Envelope<ProductPayload<ProductSummary>>), ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let product = CatalogService::new(state.catalog()).create(input).await?;

    add_breadcrumb(
        "catalog",
        "Product created",
        Some(&[
            ("slug", product.product.slug.as_str()),
            ("admin", admin.email.as_str()),
        ]),
    );

    Ok((
        StatusCode::CREATED,
        Envelope::new(ProductPayload { product }),
    ))
}

/// Update a product.
///
/// PUT /products/{id} (admin)
///
/// # Errors
///
/// Returns 400 for a non-numeric ID or invalid fields, 404 if the product
/// doesn't exist, 409 if a re-derived slug collides.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(raw): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<Envelope<ProductPayload<Product>>, ApiError> {
    let id = product_id(&raw)?;
    let Json(input) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let product = CatalogService::new(state.catalog()).update(id, input).await?;

    Ok(Envelope::new(ProductPayload { product }))
}

/// Flip a product between active and inactive.
///
/// PATCH /products/{id}/toggle-status (admin)
///
/// # Errors
///
/// Returns 400 for a non-numeric ID, 404 if the product doesn't exist.
pub async fn toggle_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(raw): Path<String>,
) -> Result<Envelope<ProductPayload<Product>>, ApiError> {
    let id = product_id(&raw)?;

    let product = CatalogService::new(state.catalog()).toggle_status(id).await?;

    Ok(Envelope::new(ProductPayload { product }))
}

/// Delete a product and its reviews.
///
/// DELETE /products/{id} (admin)
///
/// # Errors
///
/// Returns 400 for a non-numeric ID, 404 if the product doesn't exist.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(raw): Path<String>,
) -> Result<Envelope<DeletedPayload>, ApiError> {
    let id = product_id(&raw)?;

    CatalogService::new(state.catalog()).delete(id).await?;

    let id_str = id.to_string();
    add_breadcrumb(
        "catalog",
        "Product deleted",
        Some(&[("product_id", &id_str), ("admin", admin.email.as_str())]),
    );

    Ok(Envelope::new(DeletedPayload { deleted: true }))
}

/// Parse a numeric product ID from a path segment.
///
/// Mutation routes accept only numeric IDs; slugs are for reads.
fn product_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse::<i32>()
        .map(ProductId::new)
        .map_err(|_| ApiError::Validation(format!("invalid product id: {raw}")))
}
