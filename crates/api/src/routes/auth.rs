//! Authentication route handlers.
//!
//! JSON endpoints for account registration, credential login, and profile
//! lookup. Register and login both answer with the public identity plus a
//! freshly issued bearer token; `/auth/me` echoes whatever identity the
//! token resolved to.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use greenstem_core::identity::CurrentUser;

use crate::error::{ApiError, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::response::Envelope;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A signed-in session: the public identity plus its bearer token.
#[derive(Debug, Serialize)]
pub struct SessionPayload {
    pub user: CurrentUser,
    pub token: String,
}

/// The authenticated caller's profile.
#[derive(Debug, Serialize)]
pub struct ProfilePayload {
    pub user: CurrentUser,
}

/// Register a new account.
///
/// POST /auth/register
///
/// # Errors
///
/// Returns 400 for malformed input, 409 if the email is already registered.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Envelope<SessionPayload>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let auth = AuthService::new(state.identity());
    let user = auth.register(&req.email, &req.password, &req.name).await?;
    let token = state.tokens().issue(&user)?;

    add_breadcrumb(
        "auth",
        "Account registered",
        Some(&[("email", user.email.as_str())]),
    );

    Ok((
        StatusCode::CREATED,
        Envelope::new(SessionPayload {
            user: CurrentUser::from(&user),
            token,
        }),
    ))
}

/// Exchange credentials for a bearer token.
///
/// POST /auth/login
///
/// # Errors
///
/// Returns 401 for unknown emails, wrong passwords, and deactivated
/// accounts; the client message never says which.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Envelope<SessionPayload>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let auth = AuthService::new(state.identity());
    let user = auth.login(&req.email, &req.password).await?;
    let token = state.tokens().issue(&user)?;

    Ok(Envelope::new(SessionPayload {
        user: CurrentUser::from(&user),
        token,
    }))
}

/// The authenticated caller's profile.
///
/// GET /auth/me
///
/// The extractor has already re-resolved the token subject against the
/// identity store, so this just echoes the result.
pub async fn me(RequireAuth(user): RequireAuth) -> Envelope<ProfilePayload> {
    Envelope::new(ProfilePayload { user })
}
