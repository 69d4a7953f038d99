use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::backend::{AccessToken, AuthUser, Backend, BackendError, RowStore, StorageObject};
use crate::domain::{FileRecord, FileRecordCreate, SelectedFile};
use crate::uploads::{object_path, UploadError};

pub const DEFAULT_ART_BUCKET: &str = "art-files";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Client that stores job artwork and records its metadata.
#[derive(Clone)]
pub struct UploadClient {
    backend: Arc<dyn Backend>,
    bucket: String,
}

impl UploadClient {
    pub fn new(backend: Arc<dyn Backend>, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
        }
    }

    /// Upload each file in turn, inserting its `files` row right after the
    /// object is stored.
    ///
    /// # Errors
    /// `NoFiles` before any network call for an empty selection. On the first
    /// failure the remaining files are skipped; the error carries the records
    /// already written, which stay in place.
    #[instrument(skip(self, token, user, files), fields(user_id = %user.id, count = files.len()))]
    pub async fn upload_files(
        &self,
        token: &AccessToken,
        user: &AuthUser,
        job_id: Uuid,
        files: &[SelectedFile],
    ) -> Result<Vec<FileRecord>, UploadError> {
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }

        let mut uploaded = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            match self.upload_one(token, user, job_id, index, file).await {
                Ok(record) => uploaded.push(record),
                Err(source) => {
                    error!(error = %source, file_name = %file.name, stored = uploaded.len(), "Upload failed");
                    return Err(UploadError::Partial {
                        uploaded,
                        file_name: file.name.clone(),
                        source,
                    });
                }
            }
        }

        info!(count = uploaded.len(), "Files uploaded");
        Ok(uploaded)
    }

    async fn upload_one(
        &self,
        token: &AccessToken,
        user: &AuthUser,
        job_id: Uuid,
        index: usize,
        file: &SelectedFile,
    ) -> Result<FileRecord, BackendError> {
        let path = object_path(job_id, Utc::now().timestamp_millis(), index, &file.name);
        let content_type = if file.content_type.trim().is_empty() {
            FALLBACK_CONTENT_TYPE
        } else {
            file.content_type.as_str()
        };

        debug!(path = %path, "Sending request");
        self.backend
            .upload(
                token,
                StorageObject {
                    bucket: &self.bucket,
                    path: &path,
                    content_type,
                    bytes: &file.bytes,
                },
            )
            .await?;

        let record = FileRecordCreate {
            bucket: self.bucket.clone(),
            path,
            job_id,
            user_id: user.id,
            file_name: file.name.clone(),
            file_type: content_type.to_string(),
            size: file.size(),
        };
        RowStore::<FileRecord>::insert(self.backend.as_ref(), Some(token), record).await
    }
}
