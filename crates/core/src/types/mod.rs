//! Shared domain types.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::{CartItemId, OrderId, OrderItemId, ProductId, UserId};
pub use price::{CurrencyCode, Price, PriceError};
