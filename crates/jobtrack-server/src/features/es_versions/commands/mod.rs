pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateEsVersionCommand, CreateEsVersionError};
pub use delete::DeleteEsVersionError;
pub use update::{UpdateEsVersionCommand, UpdateEsVersionError};

use crate::config::UploadConfig;
use crate::error::FieldErrors;
use crate::features::es_versions::types::{EsResult, MAX_SUBMITTED_VIA_LENGTH};
use crate::features::shared::validation::validate_max_length;
use crate::storage::upload::{validate_upload, UploadedFile};
use crate::storage::{MediaStorage, ES_FILES_PREFIX};

pub(crate) const INVALID_COMPANY: &str = "Invalid company.";

/// Where uploads are checked and stored
#[derive(Debug, Clone, Copy)]
pub struct FileStore<'a> {
    pub storage: &'a MediaStorage,
    pub uploads: &'a UploadConfig,
}

impl FileStore<'_> {
    /// Record upload problems under `file`
    pub(crate) fn check(&self, errors: &mut FieldErrors, file: Option<&UploadedFile>) {
        if let Some(file) = file {
            errors.check("file", validate_upload(self.uploads, file));
        }
    }

    pub(crate) async fn save(&self, file: &UploadedFile) -> std::io::Result<String> {
        self.storage
            .save(ES_FILES_PREFIX, &file.file_name, &file.data)
            .await
    }

    /// Remove a file stored by a request that then failed
    pub(crate) async fn discard(&self, relative: Option<&str>) {
        if let Some(relative) = relative {
            if let Err(e) = self.storage.remove(relative).await {
                tracing::warn!(error = ?e, path = %relative, "Failed to remove orphaned upload");
            }
        }
    }
}

/// Shared checks for the optional text fields
pub(crate) fn check_common_fields(
    errors: &mut FieldErrors,
    result: Option<&str>,
    submitted_via: Option<&str>,
) -> Option<EsResult> {
    if let Some(via) = submitted_via {
        errors.check("submitted_via", validate_max_length(via, MAX_SUBMITTED_VIA_LENGTH));
    }

    match result.map(str::parse::<EsResult>) {
        Some(Ok(result)) => Some(result),
        Some(Err(e)) => {
            errors.add("result", e.to_string());
            None
        },
        None => None,
    }
}
