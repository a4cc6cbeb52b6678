use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentStudent};
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::api::validation::validate_upload_name;
use crate::core::state::AppState;
use crate::core::time::{current_year_tag, primitive_now_utc};
use crate::db::models::FileEntry;
use crate::db::types::FileType;
use crate::repositories;
use crate::repositories::file_repository::{FileFilter, UpdateFileEntry};
use crate::schemas::documents::{FileEntryResponse, FileEntryUpdate, FileListQuery};
use crate::services::grouping;
use crate::services::ownership::{self, OwnerRef};
use crate::services::storage;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_files))
        .route("/upload", post(upload_file))
        .route("/:file_id", patch(update_file))
}

fn parse_file_type(value: &str) -> Result<FileType, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "document" => Ok(FileType::Document),
        "source_code" | "sourcecode" => Ok(FileType::SourceCode),
        other => Err(ApiError::BadRequest(format!(
            "Invalid file_type '{other}'. Expected document or source_code"
        ))),
    }
}

#[derive(Default)]
struct UploadForm {
    file_bytes: Option<Vec<u8>>,
    file_name: Option<String>,
    content_type: Option<String>,
    file_type: Option<String>,
    description: Option<String>,
    group_id: Option<i64>,
    year: Option<String>,
}

async fn read_upload_form(multipart: &mut Multipart, max_bytes: u64) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            form.file_name = field.file_name().map(|s| s.to_string());
            form.content_type = field.content_type().map(|s| s.to_string());
            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
            {
                if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                    return Err(ApiError::BadRequest(format!(
                        "File size exceeds {}MB limit",
                        max_bytes / (1024 * 1024)
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }
            form.file_bytes = Some(bytes);
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|_| ApiError::BadRequest(format!("Invalid {name} field")))?;
        let text = text.trim().to_string();
        match name.as_str() {
            "file_type" => form.file_type = Some(text),
            "description" => form.description = Some(text),
            "year" if !text.is_empty() => form.year = Some(text),
            "group_id" if !text.is_empty() => {
                form.group_id = Some(
                    text.parse()
                        .map_err(|_| ApiError::BadRequest("Invalid group_id".to_string()))?,
                );
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn upload_file(
    student: CurrentStudent,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileEntryResponse>), ApiError> {
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("Storage is not configured".to_string()))?;
    let max_bytes = state.settings().storage().max_upload_size_mb * 1024 * 1024;

    let form = read_upload_form(&mut multipart, max_bytes).await?;
    let bytes = form
        .file_bytes
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    let file_name = form.file_name.unwrap_or_default();
    validate_upload_name(&file_name, &state.settings().storage().allowed_file_extensions)?;
    let file_type = parse_file_type(
        form.file_type.as_deref().ok_or_else(|| ApiError::BadRequest("file_type is required".to_string()))?,
    )?;
    let description = form.description.unwrap_or_default();
    let year = form.year.unwrap_or_else(current_year_tag);

    let owner = match form.group_id {
        Some(group_id) => {
            repositories::groups::find_by_id(state.db(), group_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load group"))?
                .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;
            let members = repositories::groups::member_ids(state.db(), group_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to load group members"))?;
            grouping::ensure_member(&members, student.student_id)?;
            OwnerRef::Group(group_id)
        }
        None => OwnerRef::Student(student.student_id),
    };

    let file_name = storage::sanitize_file_name(&file_name);
    let scope = format!("repository/{}/{}", owner.kind().as_str(), owner.id());
    let file_key = storage::object_key(&scope, &file_name);
    let content_type = form.content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    let stored = storage
        .upload_bytes(&file_key, &content_type, bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store file"))?;

    let recorded: Result<FileEntry, ApiError> = async {
        let mut tx = state
            .db()
            .begin()
            .await
            .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

        let version =
            repositories::file_repository::next_version(&mut *tx, owner, file_type, &file_name)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to compute file version"))?;

        let entry = repositories::file_repository::create(
            &mut *tx,
            repositories::file_repository::CreateFileEntry {
                owner,
                file_key: &file_key,
                file_name: &file_name,
                file_type,
                description: &description,
                size_bytes: stored.size_bytes,
                checksum: &stored.checksum,
                version,
                year: Some(&year),
                uploaded_at: primitive_now_utc(),
            },
        )
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to record file"))?;

        tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit file upload"))?;
        Ok(entry)
    }
    .await;

    let entry = match recorded {
        Ok(entry) => entry,
        Err(err) => {
            if let Err(error) = storage.delete_object(&file_key).await {
                tracing::error!(
                    error = %error,
                    file_key = %file_key,
                    "Repository record failed and storage object cleanup failed"
                );
            }
            return Err(err);
        }
    };
    let version = entry.version;

    tracing::info!(
        file_id = entry.id,
        student_id = student.student_id,
        owner_type = owner.kind().as_str(),
        owner_id = owner.id(),
        version,
        size_bytes = entry.size_bytes,
        action = "repository_upload",
        "File uploaded to repository"
    );

    Ok((StatusCode::CREATED, Json(FileEntryResponse::from_db(entry))))
}

async fn list_files(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<FileListQuery>,
) -> Result<Json<PaginatedResponse<FileEntryResponse>>, ApiError> {
    let page = PageQuery { skip: params.skip, limit: params.limit }.normalized();
    let filter = FileFilter {
        file_type: params.file_type,
        year: params.year.map(|year| year.trim().to_string()).filter(|year| !year.is_empty()),
    };

    let entries = repositories::file_repository::list(state.db(), &filter, page.skip, page.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list files"))?;
    let total_count = repositories::file_repository::count(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count files"))?;

    Ok(Json(PaginatedResponse {
        items: entries.into_iter().map(FileEntryResponse::from_db).collect(),
        total_count,
        skip: page.skip,
        limit: page.limit,
    }))
}

async fn update_file(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
    Json(payload): Json<FileEntryUpdate>,
) -> Result<Json<FileEntryResponse>, ApiError> {
    let current = repositories::file_repository::find_by_id(state.db(), file_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load file"))?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let owner = match payload.owner {
        Some(patch) => {
            let owner = OwnerRef::exclusive(patch.student_id, patch.group_id)?;
            ownership::resolve(state.db(), owner)
                .await
                .map_err(|e| ApiError::from_resolve(e, "Failed to load file owner"))?;
            owner
        }
        None => OwnerRef::exclusive(current.student_id, current.group_id)?,
    };
    let year = match payload.year {
        Some(year) => Some(year.trim().to_string()).filter(|year| !year.is_empty()),
        None => current.year,
    };

    let entry = repositories::file_repository::update(
        state.db(),
        file_id,
        UpdateFileEntry {
            description: payload.description.unwrap_or(current.description),
            file_type: payload.file_type.unwrap_or(current.file_type),
            year,
            owner,
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to update file"))?;

    tracing::info!(
        admin_id = admin.user_id,
        file_id,
        owner_type = owner.kind().as_str(),
        owner_id = owner.id(),
        action = "repository_update",
        "Admin updated repository file"
    );

    Ok(Json(FileEntryResponse::from_db(entry)))
}

#[cfg(test)]
mod tests;
