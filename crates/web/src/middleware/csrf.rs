//! Session-bound CSRF tokens.
//!
//! Every session carries one random token. Pages embed it in mutating forms
//! via the [`CsrfToken`] extractor; form handlers call
//! [`require_valid_token`] with the submitted value before acting.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;

/// Extractor yielding the session's CSRF token, creating one on first use.
pub struct CsrfToken(pub String);

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        if let Ok(Some(token)) = session.get::<String>(session_keys::CSRF_TOKEN).await {
            return Ok(Self(token));
        }

        let token = generate_token();
        session
            .insert(session_keys::CSRF_TOKEN, &token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

        Ok(Self(token))
    }
}

/// Check a submitted form token against the session's token.
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the session has no token or the
/// submitted value doesn't match it.
pub async fn require_valid_token(session: &Session, submitted: &str) -> Result<(), AppError> {
    let stored: Option<String> = session.get(session_keys::CSRF_TOKEN).await?;

    match stored {
        Some(token) if token == submitted => Ok(()),
        _ => Err(AppError::Forbidden("invalid CSRF token".to_string())),
    }
}

/// Generate a new random token (32 hex characters).
fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_hex_of_expected_length() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
