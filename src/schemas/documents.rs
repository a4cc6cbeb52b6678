use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Document, FileEntry};
use crate::db::types::{FileType, OwnerKind};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DocumentCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(alias = "fileKey")]
    #[validate(length(min = 1, max = 512, message = "file_key must not be empty"))]
    pub(crate) file_key: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DocumentResponse {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) file_key: String,
    pub(crate) owner_type: OwnerKind,
    pub(crate) owner_id: i64,
    pub(crate) owner_name: Option<String>,
    pub(crate) supervisor_id: i64,
    pub(crate) uploaded_at: String,
}

impl DocumentResponse {
    pub(crate) fn from_db(document: Document, owner_name: Option<String>) -> Self {
        Self {
            id: document.id,
            title: document.title,
            file_key: document.file_key,
            owner_type: document.owner_kind,
            owner_id: document.owner_id,
            owner_name,
            supervisor_id: document.supervisor_id,
            uploaded_at: format_primitive(document.uploaded_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PresignRequest {
    #[serde(alias = "fileName")]
    #[validate(length(min = 1, max = 255, message = "file_name must be 1-255 characters"))]
    pub(crate) file_name: String,
    #[serde(alias = "contentType")]
    #[validate(length(min = 1, message = "content_type must not be empty"))]
    pub(crate) content_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PresignedUrlResponse {
    pub(crate) url: String,
    pub(crate) file_key: String,
    pub(crate) expires_in: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct FileEntryResponse {
    pub(crate) id: i64,
    pub(crate) student_id: Option<i64>,
    pub(crate) group_id: Option<i64>,
    pub(crate) file_key: String,
    pub(crate) file_name: String,
    pub(crate) file_type: FileType,
    pub(crate) description: String,
    pub(crate) size_bytes: i64,
    pub(crate) checksum: String,
    pub(crate) version: i32,
    pub(crate) year: Option<String>,
    pub(crate) uploaded_at: String,
}

impl FileEntryResponse {
    pub(crate) fn from_db(entry: FileEntry) -> Self {
        Self {
            id: entry.id,
            student_id: entry.student_id,
            group_id: entry.group_id,
            file_key: entry.file_key,
            file_name: entry.file_name,
            file_type: entry.file_type,
            description: entry.description,
            size_bytes: entry.size_bytes,
            checksum: entry.checksum,
            version: entry.version,
            year: entry.year,
            uploaded_at: format_primitive(entry.uploaded_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileListQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(crate) limit: i64,
    #[serde(default)]
    pub(crate) file_type: Option<FileType>,
    #[serde(default)]
    pub(crate) year: Option<String>,
}

/// Admin patch. Absent fields keep their stored values.
#[derive(Debug, Deserialize)]
pub(crate) struct FileEntryUpdate {
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) file_type: Option<FileType>,
    #[serde(default)]
    pub(crate) year: Option<String>,
    /// Relinking requires both keys so the result names exactly one owner.
    #[serde(default)]
    pub(crate) owner: Option<OwnerPatch>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerPatch {
    #[serde(default)]
    pub(crate) student_id: Option<i64>,
    #[serde(default)]
    pub(crate) group_id: Option<i64>,
}
