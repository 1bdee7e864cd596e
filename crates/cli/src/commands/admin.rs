//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user
//! gs-cli admin create -e admin@example.com -n "Admin Name" -p "initial-password"
//! ```
//!
//! Registration through the API always produces regular accounts; admin
//! accounts are only ever created here.
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use greenstem_api::services::auth;
use greenstem_core::types::{Email, Role};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password does not meet requirements.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `password` - Initial password, hashed with Argon2id before storage
///
/// # Returns
///
/// The ID of the created admin user.
///
/// # Errors
///
/// Returns `AdminError` if validation fails, the user already exists, or
/// the database is unreachable.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    // Validate inputs before touching the database
    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
    auth::validate_password(password).map_err(|e| AdminError::WeakPassword(e.to_string()))?;
    let password_hash = auth::hash_password(password).map_err(|_| AdminError::PasswordHash)?;

    let database_url = std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("API_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin user: {}", email);

    // Check if user already exists
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM store.user WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AdminError::UserExists(email.as_str().to_owned()));
    }

    // Create the user
    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO store.user (email, name, password_hash, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(&email)
    .bind(name)
    .bind(&password_hash)
    .bind(Role::Admin)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user_id,
        email
    );

    Ok(user_id)
}
