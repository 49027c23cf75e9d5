//! Authenticated, ownership-checked access to uploaded files

pub mod access;
pub mod routes;

pub use routes::media_routes;
