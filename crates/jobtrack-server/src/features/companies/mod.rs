//! Companies the user is applying to

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::companies_routes;
pub use types::{Company, CompanyOrdering, COMPANY_AUDIT};
