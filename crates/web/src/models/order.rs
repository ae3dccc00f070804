//! Order domain types.
//!
//! An order is an immutable snapshot taken at checkout: the items copy the
//! product's title, description, and unit price at order time, so later
//! edits or deletions of the product never change order history. The
//! `product_id` on an item is informational only and may dangle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use fernwood_core::{Email, OrderId, OrderItemId, ProductId, UserId};

/// An order header. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// User who placed the order.
    pub user_id: UserId,
    /// Email of the user at order time.
    pub email: Email,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A snapshotted order line item.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    /// Unique item ID.
    pub id: OrderItemId,
    /// Order this item belongs to.
    pub order_id: OrderId,
    /// Product this was snapshotted from, if it still exists.
    pub product_id: Option<ProductId>,
    /// Units ordered.
    pub quantity: i32,
    /// Product title at order time.
    pub title: String,
    /// Product description at order time.
    pub description: String,
    /// Unit price at order time.
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Price of this line: `quantity x unit price at order time`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An order with its items, as loaded for display and invoicing.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    /// The order header.
    pub order: Order,
    /// The snapshotted line items.
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    /// Total over all line items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, unit_price_cents: i64) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: None,
            quantity,
            title: "A book".to_string(),
            description: String::new(),
            unit_price: Decimal::new(unit_price_cents, 2),
        }
    }

    #[test]
    fn item_line_total() {
        assert_eq!(item(4, 250).line_total(), Decimal::new(1000, 2));
    }

    #[test]
    fn order_total_sums_items() {
        let order = OrderWithItems {
            order: Order {
                id: OrderId::new(1),
                user_id: UserId::new(1),
                email: Email::parse("shopper@example.com").expect("valid"),
                created_at: Utc::now(),
            },
            items: vec![item(2, 1999), item(1, 500)],
        };
        assert_eq!(order.total(), Decimal::new(4498, 2));
    }
}
