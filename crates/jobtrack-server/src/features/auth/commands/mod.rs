pub mod login;
pub mod logout;
pub mod register;
pub mod update_settings;

pub use login::{LoginCommand, LoginError};
pub use register::{RegisterCommand, RegisterError};
pub use update_settings::{UpdateSettingsCommand, UpdateSettingsError};
