//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness check
//! GET    /health/ready                 - Readiness check (served by the binary)
//!
//! # Auth
//! POST   /auth/register                - Create an account, returns a token
//! POST   /auth/login                   - Exchange credentials for a token
//! GET    /auth/me                      - Current profile (requires auth)
//!
//! # Products
//! GET    /products                     - Listing with filter, sort, pagination
//! GET    /products/{idOrSlug}          - Product detail by numeric ID or slug
//! POST   /products                     - Create product (admin)
//! PUT    /products/{id}                - Update product (admin)
//! PATCH  /products/{id}/toggle-status  - Flip active/inactive (admin)
//! DELETE /products/{id}                - Delete product and reviews (admin)
//! ```
//!
//! Every response uses the `{"success": ..., ...}` envelope from
//! [`crate::response`] and [`crate::error`].

pub mod auth;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id_or_slug}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route(
            "/{id_or_slug}/toggle-status",
            patch(products::toggle_status),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
}

/// Build the application router: routes, liveness check, request tracing.
///
/// The binary wraps this with the readiness check and Sentry layers; tests
/// drive it directly.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
