//! Product domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use fernwood_core::{ProductId, UserId};

/// A catalog product.
///
/// Products are created, edited, and deleted only by their owning user.
/// The price is kept as a `NUMERIC(10,2)` in the database and as a
/// [`Decimal`] here; it is positive by a database check constraint.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// User who owns this product.
    pub user_id: UserId,
    /// Display title.
    pub title: String,
    /// Unit price in the shop currency's standard unit.
    pub price: Decimal,
    /// Long-form description.
    pub description: String,
    /// Public URL of the product image in object storage.
    pub image_url: String,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
