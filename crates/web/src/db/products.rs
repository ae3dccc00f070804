//! Product repository and catalog pagination.

use rust_decimal::Decimal;
use sqlx::PgPool;

use fernwood_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Product;

/// Derived pagination state for a catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// The requested page (1-based).
    pub current_page: i64,
    /// The last page that has any items (at least 1).
    pub last_page: i64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
    /// `current_page + 1`.
    pub next_page: i64,
    /// `current_page - 1`.
    pub prev_page: i64,
}

impl PageInfo {
    /// Derive pagination flags from the requested page and the total count.
    ///
    /// A page past the end is legal; it just has no items and `has_next`
    /// false.
    #[must_use]
    pub fn compute(page: i64, page_size: i64, total: i64) -> Self {
        let last_page = (total + page_size - 1) / page_size;
        Self {
            current_page: page,
            last_page: last_page.max(1),
            has_next: page * page_size < total,
            has_prev: page > 1,
            next_page: page + 1,
            prev_page: page - 1,
        }
    }
}

/// One page of the catalog.
#[derive(Debug, Clone)]
pub struct ProductPage {
    /// Products on this page, in insertion order.
    pub items: Vec<Product>,
    /// Derived pagination state.
    pub info: PageInfo,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch one catalog page.
    ///
    /// Returns the slice `[(page-1)*page_size, page*page_size)` in insertion
    /// order plus the derived pagination flags. A page past the end yields
    /// an empty slice, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn page(&self, page: i64, page_size: i64) -> Result<ProductPage, RepositoryError> {
        let page = page.max(1);

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        let items = sqlx::query_as::<_, Product>(
            r"
            SELECT id, user_id, title, price, description, image_url, created_at, updated_at
            FROM products
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(self.pool)
        .await?;

        Ok(ProductPage {
            items,
            info: PageInfo::compute(page, page_size, total),
        })
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, user_id, title, price, description, image_url, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List the products owned by a user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, user_id, title, price, description, image_url, created_at, updated_at
            FROM products
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Create a new product owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        title: &str,
        price: Decimal,
        description: &str,
        image_url: &str,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (user_id, title, price, description, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, price, description, image_url, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(title)
        .bind(price)
        .bind(description)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Update a product, but only when `user_id` owns it.
    ///
    /// `image_url` of `None` keeps the existing image. Returns `true` if a
    /// row was updated; `false` means the product is missing or owned by
    /// someone else, and nothing was changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_owned(
        &self,
        id: ProductId,
        user_id: UserId,
        title: &str,
        price: Decimal,
        description: &str,
        image_url: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET title = $1,
                price = $2,
                description = $3,
                image_url = COALESCE($4, image_url),
                updated_at = now()
            WHERE id = $5 AND user_id = $6
            ",
        )
        .bind(title)
        .bind(price)
        .bind(description)
        .bind(image_url)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a product, but only when `user_id` owns it.
    ///
    /// Cart rows referencing the product go with it (cascade); order item
    /// snapshots keep their copied fields and merely lose the informational
    /// product reference.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_owned(
        &self,
        id: ProductId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_five() {
        let info = PageInfo::compute(1, 2, 5);
        assert!(info.has_next);
        assert!(!info.has_prev);
        assert_eq!(info.last_page, 3);
    }

    #[test]
    fn middle_page_of_five() {
        let info = PageInfo::compute(2, 2, 5);
        assert!(info.has_next);
        assert!(info.has_prev);
        assert_eq!(info.prev_page, 1);
        assert_eq!(info.next_page, 3);
    }

    #[test]
    fn last_page_of_five() {
        let info = PageInfo::compute(3, 2, 5);
        assert!(!info.has_next);
        assert!(info.has_prev);
        assert_eq!(info.last_page, 3);
    }

    #[test]
    fn page_past_the_end() {
        let info = PageInfo::compute(9, 2, 5);
        assert!(!info.has_next);
        assert!(info.has_prev);
        assert_eq!(info.current_page, 9);
    }

    #[test]
    fn empty_catalog_still_has_one_page() {
        let info = PageInfo::compute(1, 2, 0);
        assert_eq!(info.last_page, 1);
        assert!(!info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn exact_multiple_has_no_phantom_page() {
        let info = PageInfo::compute(2, 2, 4);
        assert!(!info.has_next);
        assert_eq!(info.last_page, 2);
    }
}
