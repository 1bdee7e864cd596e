//! Shared harness for Greenstem integration tests.
//!
//! Tests build the full API router over in-memory stores and drive it
//! in-process with [`tower::ServiceExt::oneshot`], so they need neither a
//! database nor a listening socket. A handful of live-server tests sit
//! behind `#[ignore]` and talk to a running API over HTTP instead.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p greenstem-integration-tests
//!
//! # Live tests against a running server
//! cargo test -p greenstem-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, LazyLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use greenstem_api::config::ApiConfig;
use greenstem_api::db::{MemoryCatalogStore, MemoryIdentityStore};
use greenstem_api::routes;
use greenstem_api::services::auth::hash_password;
use greenstem_api::services::auth::token::TokenService;
use greenstem_api::state::AppState;
use greenstem_core::catalog::{NewProduct, Product};
use greenstem_core::identity::{NewUser, User};
use greenstem_core::store::{CatalogStore, IdentityStore};
use greenstem_core::types::{CategoryId, Email, ProductStatus, Role, Slug};

/// Signing secret shared by the app under test and the token helpers.
pub const TEST_TOKEN_SECRET: &str = "integration-test-signing-key-0123456789abcdef";

/// Password used for every seeded account.
pub const TEST_PASSWORD: &str = "hunter2hunter2";

/// Argon2 hashing is deliberately slow, so seeded accounts share one hash.
static TEST_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(TEST_PASSWORD).expect("test password should hash"));

/// Configuration for an in-process test app.
///
/// Built directly rather than from the environment so tests never depend
/// on ambient variables. The database URL is a placeholder; nothing
/// connects to it.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/greenstem_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        token_secret: SecretString::from(TEST_TOKEN_SECRET),
        token_ttl_days: 7,
        sentry_dsn: None,
    }
}

/// A token service signing with the test secret.
///
/// Tokens it issues are accepted by [`TestApp`]; a negative `ttl` mints
/// already-expired ones.
#[must_use]
pub fn token_service(ttl: Duration) -> TokenService {
    TokenService::new(TEST_TOKEN_SECRET.as_bytes(), ttl)
}

/// The API under test, with handles to its backing stores for seeding
/// state the HTTP surface cannot produce (admin accounts, reviews).
pub struct TestApp {
    router: Router,
    pub catalog: Arc<MemoryCatalogStore>,
    pub identity: Arc<MemoryIdentityStore>,
    tokens: TokenService,
}

impl TestApp {
    /// Build a fresh app over empty in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        let catalog = Arc::new(MemoryCatalogStore::default());
        let identity = Arc::new(MemoryIdentityStore::default());
        let config = test_config();
        let tokens = token_service(config.token_ttl());
        let state = AppState::new(config, catalog.clone(), identity.clone());

        Self {
            router: routes::app(state),
            catalog,
            identity,
            tokens,
        }
    }

    /// Send a request and return the status plus parsed JSON body.
    ///
    /// Non-JSON bodies (the health check) come back as a JSON string.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or delivered.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request should be delivered");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body should be readable");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, body)
    }

    /// GET without credentials.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    /// GET with a bearer token.
    pub async fn get_as(&self, token: &str, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    /// POST a JSON body, optionally authenticated.
    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// PUT a JSON body, optionally authenticated.
    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    /// PATCH without a body, optionally authenticated.
    pub async fn patch(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, None).await
    }

    /// DELETE, optionally authenticated.
    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Insert an account directly into the identity store and return it
    /// with a valid bearer token.
    ///
    /// Registration over the API always yields regular accounts, so admin
    /// tests seed theirs here. The account's password is [`TEST_PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics if the email is invalid or already seeded.
    pub async fn seed_account(&self, email: &str, role: Role) -> (User, String) {
        let user = self
            .identity
            .insert(NewUser {
                email: Email::parse(email).expect("seed email should be valid"),
                name: "Seeded Account".to_string(),
                password_hash: TEST_PASSWORD_HASH.clone(),
                role,
            })
            .await
            .expect("seed account should insert");
        let token = self.token_for(&user);

        (user, token)
    }

    /// Seed an admin account and return its bearer token.
    pub async fn admin_token(&self) -> String {
        let (_, token) = self.seed_account("admin@greenstem.dev", Role::Admin).await;
        token
    }

    /// Issue a valid token for a user, as login would.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    pub fn token_for(&self, user: &User) -> String {
        self.tokens.issue(user).expect("token should sign")
    }

    /// Insert an active product directly into the catalog store.
    ///
    /// # Panics
    ///
    /// Panics if the name does not slugify or the derived slug is taken.
    pub async fn seed_product(&self, name: &str, category: &str, price: Decimal) -> Product {
        self.catalog
            .insert(NewProduct {
                name: name.to_string(),
                slug: Slug::derive(name).expect("seed name should slugify"),
                description: String::new(),
                price,
                stock: 10,
                weight: None,
                category_id: CategoryId::new(category),
                brand: String::new(),
                status: ProductStatus::Active,
            })
            .await
            .expect("seed product should insert")
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
