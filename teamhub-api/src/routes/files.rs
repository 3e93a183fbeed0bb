/// File metadata endpoints
///
/// Bytes are uploaded to object storage by the client; these endpoints only
/// record and list the metadata.
///
/// - `GET /v1/files?taskId=` - List file metadata, newest first
/// - `POST /v1/files` - Register an uploaded file

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamhub_shared::{
    auth::middleware::AuthContext,
    models::file::FileView,
    services::files::{self, NewFile},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    pub task_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFileRequest {
    #[validate(length(max = 255, message = "Filename must be at most 255 characters"))]
    pub filename: Option<String>,

    #[validate(length(max = 1024, message = "Storage key must be at most 1024 characters"))]
    pub storage_key: Option<String>,

    #[validate(length(max = 255, message = "MIME type must be at most 255 characters"))]
    pub mime_type: Option<String>,

    pub size_bytes: Option<i64>,
    pub task_id: Option<Uuid>,
}

impl From<RegisterFileRequest> for NewFile {
    fn from(req: RegisterFileRequest) -> Self {
        NewFile {
            filename: req.filename,
            storage_key: req.storage_key,
            mime_type: req.mime_type,
            size_bytes: req.size_bytes,
            task_id: req.task_id,
        }
    }
}

pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListFilesQuery>,
) -> ApiResult<Json<Vec<FileView>>> {
    Ok(Json(files::list_files(&state.db, query.task_id).await?))
}

/// Registers file metadata and logs FILE_UPLOADED
///
/// # Errors
///
/// - `404 Not Found`: `taskId` given but no such task
/// - `422 Unprocessable Entity`: blank filename or storage key, or a size
///   outside 1 byte to 10 MiB
pub async fn register_file(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RegisterFileRequest>,
) -> ApiResult<(StatusCode, Json<FileView>)> {
    req.validate()?;

    let file = files::register_file(&state.db, &auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(file)))
}
