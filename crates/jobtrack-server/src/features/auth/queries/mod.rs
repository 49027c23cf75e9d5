pub mod profile;

pub use profile::{get_or_create_settings, get_profile};
