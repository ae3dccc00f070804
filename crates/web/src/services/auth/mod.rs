//! Authentication service.
//!
//! Registration, login, and the password-reset lifecycle. Passwords are
//! hashed with Argon2id; reset tokens are random, emailed in plaintext, and
//! stored only as a SHA-256 hash with a one-hour expiry.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use fernwood_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a password-reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// A freshly issued password-reset token, ready to be emailed.
///
/// The plaintext `token` is never persisted; only its hash is.
pub struct IssuedReset {
    /// The account the reset was issued for.
    pub user: User,
    /// Plaintext token to embed in the reset link.
    pub token: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// An unknown email and a wrong password both fail with the same
    /// `AuthError::InvalidCredentials`; nothing about the response reveals
    /// whether the account exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any credential mismatch.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Issue a password-reset token for the account behind `email`.
    ///
    /// Returns `Ok(None)` when no account matches — the caller must respond
    /// identically in both cases so the endpoint cannot be used to probe for
    /// accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address.
    pub async fn start_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<IssuedReset>, AuthError> {
        let email = Email::parse(email)?;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

        self.users
            .set_reset_token(user.id, &hash_reset_token(&token), expires_at)
            .await?;

        Ok(Some(IssuedReset { user, token }))
    }

    /// Find the account holding an unexpired reset token.
    ///
    /// Used to render the new-password form when the emailed link is opened.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetToken` when the token matches nothing
    /// or has expired.
    pub async fn find_reset_user(&self, token: &str) -> Result<User, AuthError> {
        self.users
            .find_by_reset_token(&hash_reset_token(token), Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)
    }

    /// Set a new password, consuming the reset token.
    ///
    /// Valid only when the token matches the user's stored hash and has not
    /// expired; both token columns are cleared in the same statement, so a
    /// token can never be used twice.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    /// Returns `AuthError::InvalidResetToken` if the token is wrong, expired,
    /// or already used.
    pub async fn reset_password(
        &self,
        user_id: UserId,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let new_hash = hash_password(new_password)?;
        let updated = self
            .users
            .reset_password(user_id, &hash_reset_token(token), Utc::now(), &new_hash)
            .await?;

        if !updated {
            return Err(AuthError::InvalidResetToken);
        }

        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// The PHC verify API compares digests in constant time.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a fresh reset token (32 random bytes, hex-encoded).
fn generate_reset_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a reset token for storage. Only the hash ever touches the database.
fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same password").expect("hash");
        let b = hash_password("same password").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            validate_password("seven77"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn reset_tokens_are_long_hex() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_reset_token());
    }

    #[test]
    fn token_hashing_is_deterministic_and_distinct() {
        let token = generate_reset_token();
        assert_eq!(hash_reset_token(&token), hash_reset_token(&token));
        assert_ne!(hash_reset_token(&token), token);
        assert_ne!(hash_reset_token("a"), hash_reset_token("b"));
    }
}
