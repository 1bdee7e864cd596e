//! Live tests against a running API server.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//!   (cargo run -p greenstem-cli -- migrate)
//! - The API server running (cargo run -p greenstem-api)
//! - For mutation tests, an admin account provisioned via
//!   `gs-cli admin create` with its credentials in the environment
//!
//! Run with: cargo test -p greenstem-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
fn api_base_url() -> String {
    std::env::var("GREENSTEM_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Admin credentials for mutation tests, from the environment.
fn admin_credentials() -> Option<(String, String)> {
    let email = std::env::var("GREENSTEM_ADMIN_EMAIL").ok()?;
    let password = std::env::var("GREENSTEM_ADMIN_PASSWORD").ok()?;
    Some((email, password))
}

/// A throwaway unique email so reruns don't collide on registration.
fn unique_email() -> String {
    format!(
        "live-test-{}@example.com",
        chrono::Utc::now().timestamp_micros()
    )
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health_live() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/health", api_base_url()))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_readiness_live() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/health/ready", api_base_url()))
        .send()
        .await
        .expect("Failed to reach API");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_login_me_live() {
    let client = Client::new();
    let base_url = api_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({"email": email, "password": "hunter2hunter2", "name": "Live Test"}))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    let token = body["data"]["token"].as_str().expect("Missing token").to_string();

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["email"], email);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_product_listing_live() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/products?limit=5", api_base_url()))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["data"]["products"].is_array());
    assert!(body["data"]["pagination"]["total"].is_number());
}

#[tokio::test]
#[ignore = "Requires running API server and a provisioned admin account"]
async fn test_product_lifecycle_live() {
    let Some((email, password)) = admin_credentials() else {
        return; // No admin credentials in the environment, skip
    };

    let client = Client::new();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let token = body["data"]["token"].as_str().expect("Missing token").to_string();

    // Unique name so reruns don't collide on the derived slug
    let name = format!("Live Test Item {}", chrono::Utc::now().timestamp_micros());
    let resp = client
        .post(format!("{base_url}/products"))
        .bearer_auth(&token)
        .json(&json!({"name": name, "price": 19.99, "stock": 3, "categoryId": "live-tests"}))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let id = body["data"]["product"]["id"]
        .as_i64()
        .expect("Missing product id");

    // Clean up the catalog behind the test
    let resp = client
        .delete(format!("{base_url}/products/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);
}
