//! Application services: authentication, email, payments, storage, invoices.

pub mod auth;
pub mod email;
pub mod invoice;
pub mod payment;
pub mod storage;

pub use auth::AuthService;
pub use email::EmailService;
pub use payment::PaymentClient;
pub use storage::ObjectStoreClient;
