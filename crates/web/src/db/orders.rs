//! Order repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use fernwood_core::{Email, OrderId, UserId};

use super::RepositoryError;
use crate::models::{CartLine, Order, OrderItem, OrderWithItems};

#[derive(FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    email: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            email,
            created_at: self.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Snapshot the given cart lines into a new order and clear the cart.
    ///
    /// The order insert, the item snapshots, and the cart clear are one
    /// database transaction: either the order exists and the cart is empty,
    /// or nothing happened. Item rows copy the product fields at this
    /// moment, so later product edits never touch the order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails (the
    /// transaction rolls back).
    pub async fn create_from_lines(
        &self,
        user_id: UserId,
        email: &Email,
        lines: &[CartLine],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, email)
            VALUES ($1, $2)
            RETURNING id, user_id, email, created_at
            ",
        )
        .bind(user_id)
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let order = row.into_order()?;

        for line in lines {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, title, description, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(order.id)
            .bind(line.product.id)
            .bind(line.quantity)
            .bind(&line.product.title)
            .bind(&line.product.description)
            .bind(line.product.price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order)
    }

    /// Get an order with its items by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, email, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order = row.into_order()?;
        let items = self.items_for(order.id).await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// List a user's orders, newest first, with items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, email, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order = row.into_order()?;
            let items = self.items_for(order.id).await?;
            orders.push(OrderWithItems { order, items });
        }

        Ok(orders)
    }

    async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, title, description, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }
}
