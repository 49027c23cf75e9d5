//! Shared utilities for feature modules
//!
//! - **ownership**: owner-scoped lookups used by every owned resource
//! - **validation**: field validators with client-facing messages
//! - **error_helpers**: database error classification
//! - **patch**: absent-vs-null handling for PATCH bodies
//! - **json**: JSON extractor with structured rejections
//! - **test_helpers**: fixtures (test-only)

pub mod error_helpers;
pub mod json;
pub mod ownership;
pub mod patch;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use json::AppJson;
pub use ownership::{delete_owned, fetch_owned, is_owned, list_owned, OwnedResource};
pub use patch::deserialize_nullable;
