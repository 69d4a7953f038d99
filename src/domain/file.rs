use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata row for one object uploaded to storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub bucket: String,
    pub path: String,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a file metadata row.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecordCreate {
    pub bucket: String,
    pub path: String,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub size: u64,
}

/// A file picked by the customer, not yet uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
