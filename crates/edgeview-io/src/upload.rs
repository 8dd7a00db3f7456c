//! Image uploads read from disk.

use std::path::{Path, PathBuf};

use edgeview_protocol::AnalysisRequest;

/// Allowed file extensions for image uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Check whether a filename has an allowed image extension.
fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    })
}

/// Errors that can occur while taking in an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is empty.
    #[error("{0} is empty")]
    Empty(String),

    /// The filename does not have an image extension.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
}

/// One user-selected image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    name: String,
    bytes: Vec<u8>,
}

impl Upload {
    /// Accept `bytes` uploaded under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::UnsupportedType`] if `name` lacks an image
    /// extension, or [`UploadError::Empty`] if `bytes` is empty.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        let name = name.into();
        if !has_allowed_extension(&name) {
            return Err(UploadError::UnsupportedType(name));
        }
        if bytes.is_empty() {
            return Err(UploadError::Empty(name));
        }
        Ok(Self { name, bytes })
    }

    /// Read an upload from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Read`] if the file cannot be read, and
    /// otherwise the same errors as [`new`](Self::new).
    pub async fn read(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        if !has_allowed_extension(&name) {
            return Err(UploadError::UnsupportedType(name));
        }
        let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(name, bytes)
    }

    /// Filename as uploaded.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Start an analysis of this image with the algorithm named by
    /// `selector`.
    #[must_use]
    pub fn into_request(self, selector: impl Into<String>) -> AnalysisRequest {
        AnalysisRequest::new(self.bytes, selector)
    }
}
