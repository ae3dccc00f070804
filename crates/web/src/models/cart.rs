//! Cart domain types.

use rust_decimal::Decimal;

use super::Product;

/// One line of a user's cart: a product and how many of it.
///
/// A product appears at most once per cart (enforced by the
/// `cart_items(user_id, product_id)` uniqueness constraint); re-adding a
/// product accumulates its quantity instead of duplicating the line.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// The product in the cart.
    pub product: Product,
    /// How many units (always >= 1).
    pub quantity: i32,
}

impl CartLine {
    /// Price of this line: `quantity x unit price`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Total over all cart lines.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fernwood_core::{ProductId, UserId};

    use super::*;

    fn product(id: i32, price_cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            user_id: UserId::new(1),
            title: format!("Product {id}"),
            price: Decimal::new(price_cents, 2),
            description: String::new(),
            image_url: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn line_total_multiplies_quantity() {
        let line = CartLine {
            product: product(1, 1950),
            quantity: 3,
        };
        assert_eq!(line.line_total(), Decimal::new(5850, 2));
    }

    #[test]
    fn cart_total_sums_lines() {
        let lines = vec![
            CartLine {
                product: product(1, 1000),
                quantity: 2,
            },
            CartLine {
                product: product(2, 599),
                quantity: 1,
            },
        ];
        assert_eq!(cart_total(&lines), Decimal::new(2599, 2));
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
