use thiserror::Error;

use crate::backend::BackendError;
use crate::domain::FileRecord;

/// Errors that can occur while uploading job files.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error("No files selected")]
    NoFiles,
    /// A file failed after `uploaded` were already stored. Nothing is rolled back.
    #[error("Upload of {file_name} failed: {source}")]
    Partial {
        uploaded: Vec<FileRecord>,
        file_name: String,
        source: BackendError,
    },
}

impl UploadError {
    /// Files that made it into storage and the files table before the failure.
    pub fn uploaded(&self) -> &[FileRecord] {
        match self {
            UploadError::NoFiles => &[],
            UploadError::Partial { uploaded, .. } => uploaded,
        }
    }
}
