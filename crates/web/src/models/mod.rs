//! Domain models for the storefront.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{CartLine, cart_total};
pub use order::{Order, OrderItem, OrderWithItems};
pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
