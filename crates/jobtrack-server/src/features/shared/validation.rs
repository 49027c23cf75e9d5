//! Shared validation utilities
//!
//! Validators return small typed errors whose `Display` text is the message
//! shown to API clients; commands collect them per field into
//! [`FieldErrors`](crate::error::FieldErrors).
//!
//! ```rust,ignore
//! let mut errors = FieldErrors::new();
//! errors.check("name", validate_required_text(self.name.as_deref(), 200));
//! errors.check("memo", validate_max_length(&self.memo, 200));
//! errors.into_result()?;
//! ```

use thiserror::Error;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextValidationError {
    #[error("This field is required.")]
    Required,

    #[error("This field may not be blank.")]
    Blank,

    #[error("Ensure this field has no more than {max_length} characters.")]
    TooLong { max_length: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    #[error("This field is required.")]
    Required,

    #[error("Enter a valid email address.")]
    InvalidFormat,

    #[error("Ensure this field has no more than 254 characters.")]
    TooLong,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordValidationError {
    #[error("This field is required.")]
    Required,

    #[error("Ensure this field has at least 8 characters.")]
    TooShort,

    #[error("Passwords do not match.")]
    Mismatch,
}

/// Length limit counted in characters, not bytes
pub fn validate_max_length(value: &str, max_length: usize) -> Result<(), TextValidationError> {
    if value.chars().count() > max_length {
        return Err(TextValidationError::TooLong { max_length });
    }
    Ok(())
}

/// Present, not only whitespace, and within `max_length`
pub fn validate_required_text(
    value: Option<&str>,
    max_length: usize,
) -> Result<(), TextValidationError> {
    let value = value.ok_or(TextValidationError::Required)?;
    validate_not_blank(value, max_length)
}

/// Not only whitespace, and within `max_length`
pub fn validate_not_blank(value: &str, max_length: usize) -> Result<(), TextValidationError> {
    if value.trim().is_empty() {
        return Err(TextValidationError::Blank);
    }
    validate_max_length(value, max_length)
}

/// Basic shape check: `local@domain.tld`, no whitespace
pub fn validate_email(email: Option<&str>) -> Result<(), EmailValidationError> {
    let email = email.ok_or(EmailValidationError::Required)?;

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(EmailValidationError::TooLong);
    }

    if !is_valid_email(email) {
        return Err(EmailValidationError::InvalidFormat);
    }

    Ok(())
}

#[inline]
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        },
        None => false,
    }
}

pub fn validate_password(password: Option<&str>) -> Result<(), PasswordValidationError> {
    let password = password.ok_or(PasswordValidationError::Required)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordValidationError::TooShort);
    }
    Ok(())
}

pub fn validate_password_confirmation(
    password: Option<&str>,
    confirmation: Option<&str>,
) -> Result<(), PasswordValidationError> {
    if password != confirmation {
        return Err(PasswordValidationError::Mismatch);
    }
    Ok(())
}
