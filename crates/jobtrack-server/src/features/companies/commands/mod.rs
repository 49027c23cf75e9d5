pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateCompanyCommand, CreateCompanyError};
pub use delete::DeleteCompanyError;
pub use update::{UpdateCompanyCommand, UpdateCompanyError};
