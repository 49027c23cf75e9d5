//! Validation of uploaded files before they are stored

use axum::body::Bytes;
use std::io::Cursor;
use thiserror::Error;

use super::{file_extension, signature};
use crate::config::UploadConfig;

/// A file received in a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn extension(&self) -> String {
        file_extension(&self.file_name)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadValidationError {
    #[error("File size must be under {max_mb:.0}MB. Current size: {actual_mb:.1}MB")]
    TooLarge { max_mb: f64, actual_mb: f64 },

    #[error("File type '{extension}' not allowed. Allowed: {allowed}")]
    ExtensionNotAllowed { extension: String, allowed: String },

    #[error("{0}")]
    SignatureMismatch(#[from] signature::SignatureMismatch),
}

const MIB: f64 = 1024.0 * 1024.0;

/// Size, extension allow-list, then content signature
///
/// A name without an extension skips the allow-list; no signature is
/// registered for it either.
pub fn validate_upload(
    config: &UploadConfig,
    file: &UploadedFile,
) -> Result<(), UploadValidationError> {
    if file.size() > config.max_bytes {
        return Err(UploadValidationError::TooLarge {
            max_mb: config.max_bytes as f64 / MIB,
            actual_mb: file.size() as f64 / MIB,
        });
    }

    let extension = file.extension();
    if !extension.is_empty() && !config.is_allowed_extension(&extension) {
        return Err(UploadValidationError::ExtensionNotAllowed {
            extension,
            allowed: config.allowed_extensions.join(", "),
        });
    }

    let mut cursor = Cursor::new(file.data.as_ref());
    match signature::check_stream(&mut cursor, &extension) {
        Ok(result) => result.map_err(UploadValidationError::from),
        // Reading from memory cannot fail; treat it as a mismatch if it ever does
        Err(_) => Err(signature::SignatureMismatch {
            extension,
            expected: "readable content".to_string(),
        }
        .into()),
    }
}
