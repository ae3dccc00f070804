//! Request middleware: sessions, authentication, CSRF.

pub mod auth;
pub mod csrf;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use csrf::{CsrfToken, require_valid_token};
pub use session::create_session_layer;
