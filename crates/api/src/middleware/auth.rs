//! Authentication middleware and extractors.
//!
//! Bearer-token extractors for route handlers. Every authenticated request
//! re-resolves the token subject against the identity store, so deactivated
//! accounts lose access immediately even while their tokens are unexpired.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use greenstem_core::identity::CurrentUser;

use crate::error::{ApiError, set_sentry_user};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, state).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires a valid bearer token belonging to an admin.
///
/// Authentication failures reject exactly like [`RequireAuth`]; a valid
/// non-admin caller is rejected with `403 Forbidden`.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally resolves the current user.
///
/// Unlike `RequireAuth`, this never rejects the request: a missing, invalid,
/// or expired token simply yields `None`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(
///     OptionalAuth(user): OptionalAuth,
/// ) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(&parts.headers, state).await.ok()))
    }
}

/// Resolve the bearer token in `headers` to a live user.
async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<CurrentUser, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthenticated("Authentication required".to_string()))?;

    let claims = state.tokens().verify(token)?;

    // The token only names the subject; the stored user is authoritative
    // for both existence and role.
    let user = state
        .identity()
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid identity".to_string()))?;

    if !user.is_active {
        return Err(ApiError::Auth(AuthError::AccountInactive));
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(CurrentUser::from(&user))
}

/// Extract the token from an `Authorization: Bearer ...` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
