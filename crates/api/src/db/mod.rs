//! Database operations for the catalog `PostgreSQL`.
//!
//! # Database: `greenstem`
//!
//! ## Tables (schema `store`)
//!
//! - `user` - Accounts for both shoppers and admins
//! - `product` - Catalog records
//! - `review` - Product reviews with star ratings
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p greenstem-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod products;
pub mod users;

pub use memory::{MemoryCatalogStore, MemoryIdentityStore};
pub use products::PgCatalogStore;
pub use users::PgIdentityStore;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
