pub mod get;
pub mod list;

pub use get::GetCompanyError;
pub use list::ListCompaniesQuery;
