//! Entry-sheet versions filed under the user's companies

pub mod commands;
pub mod payload;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::es_routes;
pub use types::{EsResult, EsVersion, EsVersionSummary, ES_AUDIT};
