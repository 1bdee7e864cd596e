//! Tests for admin catalog mutations and their role gates.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use chrono::Duration;
use rust_decimal::Decimal;
use serde_json::json;

use greenstem_core::store::CatalogStore;
use greenstem_core::types::Role;
use greenstem_integration_tests::{TestApp, token_service};

// ============================================================================
// Role gates
// ============================================================================

#[tokio::test]
async fn test_create_requires_admin_role() {
    let app = TestApp::new();
    let (_, user_token) = app.seed_account("shopper@example.com", Role::User).await;
    let input = json!({"name": "Gadget", "price": 5.0, "stock": 1, "categoryId": "c1"});

    let (status, body) = app.post("/products", Some(&user_token), input.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Insufficient permissions");

    let (status, body) = app.post("/products", None, input).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn test_role_gate_covers_all_mutations() {
    let app = TestApp::new();
    let (_, user_token) = app.seed_account("shopper@example.com", Role::User).await;

    let attempts = [
        (Method::POST, "/products"),
        (Method::PUT, "/products/1"),
        (Method::PATCH, "/products/1/toggle-status"),
        (Method::DELETE, "/products/1"),
    ];

    for (method, uri) in attempts {
        let (status, body) = app
            .request(method.clone(), uri, Some(&user_token), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["message"], "Insufficient permissions", "{method} {uri}");

        let (status, _) = app.request(method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_mutations_reject_expired_admin_token() {
    let app = TestApp::new();
    let (admin, _) = app.seed_account("admin@example.com", Role::Admin).await;
    let expired = token_service(Duration::hours(-2)).issue(&admin).unwrap();

    let (status, body) = app
        .post(
            "/products",
            Some(&expired),
            json!({"name": "Gadget", "price": 5.0, "stock": 1, "categoryId": "c1"}),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_and_fetch_product() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/products",
            Some(&admin),
            json!({
                "name": "Test Phone",
                "price": 999.99,
                "stock": 5,
                "categoryId": "c1",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let product = &body["data"]["product"];
    assert_eq!(product["name"], "Test Phone");
    assert_eq!(product["slug"], "test-phone");
    assert_eq!(product["status"], "active");
    assert_eq!(product["description"], "");
    assert_eq!(product["price"], 999.99);
    assert_eq!(product["averageRating"], 0.0);
    assert_eq!(product["reviewCount"], 0);

    let (status, body) = app.get("/products/test-phone").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["name"], "Test Phone");
}

#[tokio::test]
async fn test_created_products_appear_in_listing() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    app.post(
        "/products",
        Some(&admin),
        json!({"name": "Fresh Item", "price": 3.5, "stock": 2, "categoryId": "c9"}),
    )
    .await;

    let (_, body) = app.get("/products").await;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["products"][0]["slug"], "fresh-item");
}

#[tokio::test]
async fn test_create_validates_fields() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let cases = [
        (
            json!({"name": "  ", "price": 1.0, "stock": 1, "categoryId": "c1"}),
            "Name must not be empty",
        ),
        (
            json!({"name": "Widget", "price": -1.0, "stock": 1, "categoryId": "c1"}),
            "price must not be negative",
        ),
        (
            json!({"name": "Widget", "price": 1.0, "stock": -2, "categoryId": "c1"}),
            "stock must not be negative",
        ),
        (
            json!({"name": "Widget", "price": 1.0, "stock": 1, "weight": -0.5, "categoryId": "c1"}),
            "weight must not be negative",
        ),
        (
            json!({"name": "Widget", "price": 1.0, "stock": 1, "categoryId": "  "}),
            "categoryId must not be empty",
        ),
    ];

    for (input, message) in cases {
        let (status, body) = app.post("/products", Some(&admin), input).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app
        .post("/products", Some(&admin), json!({"name": "No Price"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_duplicate_slug_conflicts() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    app.post(
        "/products",
        Some(&admin),
        json!({"name": "Test Phone", "price": 1.0, "stock": 1, "categoryId": "c1"}),
    )
    .await;
    // Different name, same derived slug
    let (status, body) = app
        .post(
            "/products",
            Some(&admin),
            json!({"name": "Test  Phone!!", "price": 2.0, "stock": 2, "categoryId": "c2"}),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A product with this slug already exists");
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_product_fields() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let product = app.seed_product("Old Name", "c1", Decimal::from(10)).await;

    let (status, body) = app
        .put(
            &format!("/products/{}", product.id),
            Some(&admin),
            json!({"name": "New Name", "price": 12.5, "stock": 3}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"]["product"];
    assert_eq!(updated["name"], "New Name");
    assert_eq!(updated["slug"], "new-name");
    assert_eq!(updated["price"], 12.5);
    assert_eq!(updated["stock"], 3);
}

#[tokio::test]
async fn test_update_rejects_slug_in_place_of_id() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.seed_product("Old Name", "c1", Decimal::from(10)).await;

    let (status, body) = app
        .put("/products/old-name", Some(&admin), json!({"stock": 1}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid product id: old-name");
}

#[tokio::test]
async fn test_update_missing_product() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app
        .put("/products/999", Some(&admin), json!({"stock": 1}))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_update_slug_collision_conflicts() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    app.seed_product("Taken Name", "c1", Decimal::from(10)).await;
    let free = app.seed_product("Free Name", "c1", Decimal::from(10)).await;

    let (status, body) = app
        .put(
            &format!("/products/{}", free.id),
            Some(&admin),
            json!({"name": "Taken Name"}),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A product with this slug already exists");
}

// ============================================================================
// Toggle status & delete
// ============================================================================

#[tokio::test]
async fn test_toggle_status_roundtrip() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let product = app.seed_product("Flippable", "c1", Decimal::from(10)).await;
    let uri = format!("/products/{}/toggle-status", product.id);

    let (status, body) = app.patch(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["status"], "inactive");

    let (_, body) = app.patch(&uri, Some(&admin)).await;
    assert_eq!(body["data"]["product"]["status"], "active");
}

#[tokio::test]
async fn test_toggle_status_missing_product() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app.patch("/products/999/toggle-status", Some(&admin)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn test_delete_product_and_reviews() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let product = app.seed_product("Doomed", "c1", Decimal::from(10)).await;
    app.catalog.seed_review(product.id, 4, "Fine", "Alice");
    let uri = format!("/products/{}", product.id);

    let (status, body) = app.delete(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = app.get("/products/doomed").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let reviews = app.catalog.reviews_for(product.id).await.unwrap();
    assert!(reviews.is_empty());

    // Deleting again reports the product as gone
    let (status, body) = app.delete(&uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");
}
