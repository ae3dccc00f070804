//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Catalog (paginated)
//! GET  /health                  - Liveness check (wired in main)
//!
//! # Catalog
//! GET  /products                - Catalog (paginated)
//! GET  /products/{id}           - Product detail
//!
//! # Cart (requires auth)
//! GET  /cart                    - Cart page
//! POST /cart                    - Add to cart
//! POST /cart/delete             - Remove from cart
//!
//! # Checkout (requires auth)
//! GET  /checkout                - Create payment session, show summary
//! GET  /checkout/success        - Verify payment, place order
//! GET  /checkout/cancel         - Back to cart
//!
//! # Orders (requires auth)
//! GET  /orders                  - Order history
//! GET  /orders/{id}/invoice     - Invoice PDF (owner only)
//!
//! # Product administration (requires auth, owner-scoped)
//! GET  /admin/products          - Own products
//! GET  /admin/products/new      - Create form
//! POST /admin/products          - Create (multipart)
//! GET  /admin/products/{id}/edit - Edit form
//! POST /admin/products/{id}     - Update (multipart)
//! POST /admin/products/{id}/delete - Delete
//!
//! # Auth
//! GET  /auth/login   POST /auth/login
//! GET  /auth/signup  POST /auth/signup
//! POST /auth/logout
//! GET  /auth/reset   POST /auth/reset
//! GET  /auth/reset/{token}      - New-password form
//! POST /auth/new-password       - Perform reset
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};
use rust_decimal::Decimal;

use crate::state::AppState;

/// Format a decimal amount as a display price string.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${amount:.2}")
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/reset", get(auth::reset_page).post(auth::request_reset))
        .route("/reset/{token}", get(auth::new_password_page))
        .route("/new-password", post(auth::new_password))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/delete", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::start))
        .route("/success", get(checkout::success))
        .route("/cancel", get(checkout::cancel))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}/invoice", get(orders::invoice))
}

/// Create the product administration router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::index).post(admin::create))
        .route("/products/new", get(admin::new_product))
        .route("/products/{id}/edit", get(admin::edit))
        .route("/products/{id}", post(admin::update))
        .route("/products/{id}/delete", post(admin::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/products", get(shop::index))
        .route("/products/{id}", get(shop::product_detail))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
        .nest("/auth", auth_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_format_with_two_decimals() {
        assert_eq!(format_price(Decimal::new(1999, 2)), "$19.99");
        assert_eq!(format_price(Decimal::new(500, 2)), "$5.00");
        assert_eq!(format_price(Decimal::from(3)), "$3.00");
    }
}
