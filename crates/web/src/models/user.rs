//! User domain type.
//!
//! The password hash and reset-token state stay in the repository layer;
//! handlers only ever see this validated domain object.

use chrono::{DateTime, Utc};

use fernwood_core::{Email, UserId};

/// A storefront account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address (stored lowercase, unique).
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}
