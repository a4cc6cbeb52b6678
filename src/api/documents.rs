use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentSupervisor, CurrentUser};
use crate::api::validation::{validate_payload, validate_upload_name};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Document;
use crate::repositories;
use crate::schemas::documents::{
    DocumentCreate, DocumentResponse, PresignRequest, PresignedUrlResponse,
};
use crate::services::access::Role;
use crate::services::ownership::{self, Owner, OwnerRef};
use crate::services::{grouping, notifications, storage};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/student", post(upload_student_document))
        .route("/group", post(upload_group_document))
        .route("/supervised", get(supervised_documents))
        .route("/mine", get(my_documents))
        .route("/:document_id/download-url", get(download_url))
}

pub(crate) fn uploads_router() -> Router<AppState> {
    Router::new().route("/presigned-url", post(presigned_upload_url))
}

async fn store_document(
    state: &AppState,
    uploader_id: i64,
    owner: Owner,
    payload: &DocumentCreate,
) -> Result<Document, ApiError> {
    let file_key = payload.file_key.trim();
    if !storage::key_in_scope(file_key, &storage::user_document_scope(uploader_id)) {
        return Err(ApiError::BadRequest(
            "file_key must be a key issued by the presigned upload endpoint".to_string(),
        ));
    }

    let supervisor_id = owner.supervisor_id().ok_or_else(|| {
        ApiError::BadRequest("No supervisor assigned. Documents cannot be uploaded yet".to_string())
    })?;

    let document = repositories::documents::create(
        state.db(),
        repositories::documents::CreateDocument {
            title: payload.title.trim(),
            file_key,
            owner: owner.owner_ref(),
            supervisor_id,
            uploaded_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_db(e, "Failed to store document"))?;

    tracing::info!(
        document_id = document.id,
        owner_type = owner.owner_ref().kind().as_str(),
        owner_id = owner.owner_ref().id(),
        supervisor_id,
        action = "document_upload",
        "Document uploaded"
    );

    match repositories::users::find_by_id(state.db(), supervisor_id).await {
        Ok(Some(supervisor)) => {
            let event = notifications::document_uploaded(&supervisor, &owner, &document.title);
            notifications::dispatch(state, vec![event]).await;
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, supervisor_id, "Failed to load supervisor for notification");
        }
    }

    Ok(document)
}

async fn upload_student_document(
    student: CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<DocumentCreate>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    validate_payload(&payload)?;

    let owner = ownership::resolve(state.db(), OwnerRef::Student(student.student_id))
        .await
        .map_err(|e| ApiError::from_resolve(e, "Failed to load student"))?;
    let owner_name = owner.display_name().to_string();

    let document = store_document(&state, student.principal.user_id, owner, &payload).await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from_db(document, Some(owner_name)))))
}

async fn upload_group_document(
    student: CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<DocumentCreate>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    validate_payload(&payload)?;

    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?
        .ok_or_else(|| ApiError::NotFound("You are not in a group".to_string()))?;
    grouping::ensure_leader(&group, student.student_id)?;

    let owner = Owner::Group(group);
    let owner_name = owner.display_name().to_string();

    let document = store_document(&state, student.principal.user_id, owner, &payload).await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from_db(document, Some(owner_name)))))
}

async fn with_owner_names(
    state: &AppState,
    documents: Vec<Document>,
) -> Result<Vec<DocumentResponse>, ApiError> {
    let refs: Vec<OwnerRef> = documents
        .iter()
        .map(|document| OwnerRef::from_parts(document.owner_kind, document.owner_id))
        .collect();
    let names = ownership::display_names(state.db(), &refs)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load document owners"))?;

    Ok(documents
        .into_iter()
        .zip(refs)
        .map(|(document, owner)| DocumentResponse::from_db(document, names.get(&owner).cloned()))
        .collect())
}

async fn supervised_documents(
    CurrentSupervisor(supervisor_id): CurrentSupervisor,
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = repositories::documents::list_by_supervisor(state.db(), supervisor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list documents"))?;
    Ok(Json(with_owner_names(&state, documents).await?))
}

async fn my_documents(
    student: CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let group = repositories::groups::find_for_student(state.db(), student.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load group"))?;
    let documents = repositories::documents::list_for_student(
        state.db(),
        student.student_id,
        group.map(|group| group.id),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list documents"))?;
    Ok(Json(with_owner_names(&state, documents).await?))
}

async fn download_url(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
) -> Result<Json<PresignedUrlResponse>, ApiError> {
    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("Storage is not configured".to_string()))?;

    let document = repositories::documents::find_by_id(state.db(), document_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load document"))?
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    let allowed = match principal.role {
        Role::Admin => true,
        Role::Supervisor => document.supervisor_id == principal.user_id,
        Role::Student { student_id } => {
            match OwnerRef::from_parts(document.owner_kind, document.owner_id) {
                OwnerRef::Student(owner_id) => owner_id == student_id,
                OwnerRef::Group(group_id) => repositories::groups::member_ids(state.db(), group_id)
                    .await
                    .map_err(|e| ApiError::internal(e, "Failed to load group members"))?
                    .contains(&student_id),
            }
        }
        Role::Unassigned => false,
    };
    if !allowed {
        return Err(ApiError::Forbidden("You do not have access to this document"));
    }

    let url = storage
        .presign_get(&document.file_key)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to presign download"))?;

    Ok(Json(PresignedUrlResponse {
        url,
        file_key: document.file_key,
        expires_in: storage.presign_ttl().as_secs(),
    }))
}

async fn presigned_upload_url(
    CurrentUser(principal): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignRequest>,
) -> Result<Json<PresignedUrlResponse>, ApiError> {
    validate_payload(&payload)?;
    validate_upload_name(&payload.file_name, &state.settings().storage().allowed_file_extensions)?;

    let storage = state
        .storage()
        .ok_or_else(|| ApiError::ServiceUnavailable("Storage is not configured".to_string()))?;

    let file_key =
        storage::object_key(&storage::user_document_scope(principal.user_id), &payload.file_name);
    let url = storage
        .presign_put(&file_key, payload.content_type.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to presign upload"))?;

    Ok(Json(PresignedUrlResponse { url, file_key, expires_in: storage.presign_ttl().as_secs() }))
}
