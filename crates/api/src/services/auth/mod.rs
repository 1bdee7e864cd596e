//! Authentication service.
//!
//! Password registration and login backed by Argon2id hashes, plus the
//! stateless access token layer in [`token`].

mod error;
pub mod token;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use greenstem_core::identity::{NewUser, User};
use greenstem_core::store::{IdentityStore, StoreError};
use greenstem_core::types::{Email, Role};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles user registration and login against an [`IdentityStore`].
pub struct AuthService<'a> {
    identity: &'a dyn IdentityStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityStore) -> Self {
        Self { identity }
    }

    /// Register a new user with email, password, and display name.
    ///
    /// New accounts always get the default role; promotion happens through
    /// administrative tooling, never through this endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::InvalidName` if the name is empty.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        // Validate email
        let email = Email::parse(email)?;

        // Validate name
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidName(
                "name must not be empty".to_string(),
            ));
        }

        // Validate password
        validate_password(password)?;

        // Hash password
        let password_hash = hash_password(password)?;

        // Create user
        let user = self
            .identity
            .insert(NewUser {
                email,
                name: name.to_string(),
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountInactive` if the account is deactivated.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // Validate email format
        let email = Email::parse(email)?;

        // Find the user; an unknown email reads the same as a bad password
        let user = self
            .identity
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Verify password
        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        // Deactivated accounts keep their credentials but cannot sign in
        if !user.is_active {
            return Err(AuthError::AccountInactive);
        }

        self.identity.record_login(user.id).await?;

        Ok(user)
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// Malformed stored hashes verify as `false` rather than erroring.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::db::memory::MemoryIdentityStore;

    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();

        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_hash_uses_argon2id() {
        let hash = hash_password("some-password").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_malformed_hash_is_false() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let store = MemoryIdentityStore::default();
        let service = AuthService::new(&store);

        let user = service
            .register("Alice@Example.com", "hunter2hunter2", "Alice")
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "alice@example.com");
        assert_eq!(user.role, Role::User);
        assert!(user.last_login_at.is_none());

        let logged_in = service
            .login("alice@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryIdentityStore::default();
        let service = AuthService::new(&store);

        service
            .register("bob@example.com", "hunter2hunter2", "Bob")
            .await
            .unwrap();
        let result = service
            .register("bob@example.com", "otherpassword", "Bobby")
            .await;

        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let store = MemoryIdentityStore::default();
        let service = AuthService::new(&store);

        assert!(matches!(
            service.register("not-an-email", "hunter2hunter2", "X").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            service.register("x@example.com", "short", "X").await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            service.register("x@example.com", "hunter2hunter2", "  ").await,
            Err(AuthError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let store = MemoryIdentityStore::default();
        let service = AuthService::new(&store);

        service
            .register("carol@example.com", "hunter2hunter2", "Carol")
            .await
            .unwrap();
        let result = service.login("carol@example.com", "wrong-password").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let store = MemoryIdentityStore::default();
        let service = AuthService::new(&store);

        let result = service.login("ghost@example.com", "hunter2hunter2").await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let store = MemoryIdentityStore::default();
        let service = AuthService::new(&store);

        let user = service
            .register("dan@example.com", "hunter2hunter2", "Dan")
            .await
            .unwrap();
        store.deactivate(user.id);

        let result = service.login("dan@example.com", "hunter2hunter2").await;

        assert!(matches!(result, Err(AuthError::AccountInactive)));
    }

    #[tokio::test]
    async fn test_login_records_timestamp() {
        let store = MemoryIdentityStore::default();
        let service = AuthService::new(&store);

        service
            .register("erin@example.com", "hunter2hunter2", "Erin")
            .await
            .unwrap();
        let user = service
            .login("erin@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
    }
}
