//! Local media storage for uploaded files
//!
//! Files live under a single media root. Callers only ever see paths relative
//! to that root (e.g. `es_files/3f2c..._resume.pdf`); [`MediaStorage::resolve`]
//! is the only way back to a filesystem path and refuses anything that would
//! escape the root.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub mod signature;
pub mod upload;

/// Prefix for entry-sheet attachments.
pub const ES_FILES_PREFIX: &str = "es_files/";

/// URL prefix under which stored files are served.
pub const MEDIA_URL_PREFIX: &str = "/media/";

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the media root if it does not exist yet
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        info!(root = %self.root.display(), "Media storage ready");
        Ok(())
    }

    /// Store `data` under `prefix` and return the relative path
    ///
    /// The stored name is a random id followed by the sanitized original name,
    /// so uploads never collide or overwrite each other.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn save(&self, prefix: &str, original_name: &str, data: &[u8]) -> io::Result<String> {
        let relative = format!(
            "{}{}_{}",
            prefix,
            Uuid::new_v4().simple(),
            sanitize_file_name(original_name)
        );
        let full_path = self.root.join(&relative);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, data).await?;

        debug!(path = %relative, "Stored media file");
        Ok(relative)
    }

    /// Remove a stored file; missing files are not an error
    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        match self.resolve(relative).await {
            Some(path) => tokio::fs::remove_file(path).await,
            None => {
                warn!(path = %relative, "Media file to remove was not found");
                Ok(())
            },
        }
    }

    /// Absolute path of an existing regular file inside the root
    ///
    /// Returns `None` when the file does not exist, is not a regular file, or
    /// resolves (through `..` segments, absolute paths or symlinks) to a
    /// location outside the media root.
    pub async fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let root = tokio::fs::canonicalize(&self.root).await.ok()?;
        let full_path = tokio::fs::canonicalize(root.join(relative)).await.ok()?;

        if !full_path.starts_with(&root) {
            warn!(path = %relative, "Rejected media path outside of root");
            return None;
        }

        let metadata = tokio::fs::metadata(&full_path).await.ok()?;
        metadata.is_file().then_some(full_path)
    }
}

/// Public URL for a stored relative path
pub fn media_url(relative: &str) -> String {
    format!("{MEDIA_URL_PREFIX}{relative}")
}

/// Lowercased extension including the dot, or `""` when there is none
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => String::new(),
    }
}

/// Keep only the final path component and replace anything outside
/// `[A-Za-z0-9._-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
