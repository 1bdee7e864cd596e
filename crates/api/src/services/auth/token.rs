//! Access token issuing and verification.
//!
//! Tokens are stateless HS256 JWTs. The signing secret comes from
//! configuration; the set of claims is deliberately small so a token can be
//! checked without a database round trip (the middleware still re-resolves
//! the subject to pick up deactivations).

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use greenstem_core::identity::User;
use greenstem_core::types::{Role, UserId};

/// Errors that can occur when issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token signature is valid but the expiry has passed.
    #[error("token has expired")]
    Expired,

    /// Token is malformed, has a bad signature, or carries bad claims.
    #[error("invalid or malformed token")]
    Invalid,

    /// Token could not be signed.
    #[error("token signing failed")]
    Signing,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Email at issue time (informational only).
    pub email: String,
    /// Role at issue time (informational only; roles are re-checked
    /// against the stored user on every request).
    pub role: Role,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Issues and verifies access tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from a signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Issue a signed token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.as_str().to_owned(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| TokenError::Signing)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for a well-formed token past its expiry,
    /// `TokenError::Invalid` for anything else that fails verification.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
