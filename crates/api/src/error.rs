//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, ApiError>`. Responses use the standard failure envelope
//! `{"success": false, "message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use greenstem_core::store::StoreError;

use crate::services::auth::AuthError;
use crate::services::auth::token::TokenError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Storage operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Access token was malformed, tampered with, or expired.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Request input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request carried no usable credential.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller is authenticated but lacks the required role.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Store(err) => store_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::AccountInactive => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidName(_) => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Store(err) => store_status(err),
            },
            Self::Token(err) => match err {
                TokenError::Expired | TokenError::Invalid => StatusCode::UNAUTHORIZED,
                TokenError::Signing => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Capture server errors to Sentry; expected outcomes (not found,
        // conflict, rejected credentials) respond without error logging.
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(err) => store_message(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::AccountInactive => "Account is inactive".to_string(),
                AuthError::EmailTaken => "An account with this email already exists".to_string(),
                AuthError::WeakPassword(msg) | AuthError::InvalidName(msg) => msg.clone(),
                AuthError::InvalidEmail(err) => err.to_string(),
                AuthError::PasswordHash => "Internal server error".to_string(),
                AuthError::Store(err) => store_message(err),
            },
            Self::Token(err) => match err {
                TokenError::Expired => "Token has expired".to_string(),
                TokenError::Invalid => "Invalid or malformed token".to_string(),
                TokenError::Signing => "Internal server error".to_string(),
            },
            Self::Forbidden => "Insufficient permissions".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(msg)
            | Self::Unauthenticated(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

const fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::NotFound => "Resource not found".to_string(),
        StoreError::Conflict(msg) => msg.clone(),
        _ => "Internal server error".to_string(),
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for request actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
