pub mod get;
pub mod list;

pub use get::GetEsVersionError;
pub use list::ListEsVersionsQuery;
