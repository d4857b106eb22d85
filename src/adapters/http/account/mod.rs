//! Login and account moderation over HTTP.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{login_error_status, AccountHandlers};
pub use routes::account_routes;
