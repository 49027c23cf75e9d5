//! Accounts, sessions and per-user settings

pub mod commands;
pub mod password;
pub mod queries;
pub mod routes;
pub mod session;
pub mod types;

pub use routes::auth_routes;
pub use session::CurrentUser;
pub use types::{UserProfile, UserSettings};
