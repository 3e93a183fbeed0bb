/// File metadata registration
///
/// The bytes are stored elsewhere; this records the metadata and logs
/// FILE_UPLOADED.

use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{optional_text, reference_error, required_text};
use crate::auth::middleware::AuthContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::activity::{Activity, ActivityType, NewActivity};
use crate::models::file::{CreateFile, FileRecord, FileView, DEFAULT_MIME_TYPE, MAX_FILE_SIZE_BYTES};
use crate::models::task::Task;

#[derive(Debug, Clone, Default)]
pub struct NewFile {
    pub filename: Option<String>,
    pub storage_key: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub task_id: Option<Uuid>,
}

fn validate_size(size_bytes: Option<i64>) -> ServiceResult<i64> {
    match size_bytes {
        None => Err(ServiceError::validation("sizeBytes", "File size is required")),
        Some(size) if size <= 0 => Err(ServiceError::validation(
            "sizeBytes",
            "File size must be greater than zero",
        )),
        Some(size) if size > MAX_FILE_SIZE_BYTES => Err(ServiceError::validation(
            "sizeBytes",
            "File exceeds the 10 MB limit",
        )),
        Some(size) => Ok(size),
    }
}

/// Registers uploaded file metadata
///
/// # Errors
///
/// - `Validation` if the filename or storage key is blank, or the size is
///   not in `1..=10 MiB`
/// - `NotFound` if a task is given and does not exist
pub async fn register_file(
    pool: &PgPool,
    actor: &AuthContext,
    input: NewFile,
) -> ServiceResult<FileView> {
    let filename = required_text(input.filename, "filename", "Filename")?;
    let storage_key = required_text(input.storage_key, "storageKey", "Storage key")?;
    let size_bytes = validate_size(input.size_bytes)?;
    let mime_type = optional_text(input.mime_type).unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    let mut tx = pool.begin().await?;

    let task = match input.task_id {
        Some(task_id) => Some(
            Task::find_by_id(&mut *tx, task_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Task"))?,
        ),
        None => None,
    };

    let file = FileRecord::create(
        &mut *tx,
        CreateFile {
            filename,
            storage_key,
            mime_type,
            size_bytes,
            task_id: input.task_id,
            uploaded_by: actor.user_id,
        },
    )
    .await
    .map_err(reference_error)?;

    let mut activity = NewActivity::new(
        ActivityType::FileUploaded,
        actor.user_id,
        match &task {
            Some(task) => format!("Uploaded \"{}\" to \"{}\"", file.file.filename, task.title),
            None => format!("Uploaded \"{}\" to the resource library", file.file.filename),
        },
    )
    .metadata(json!({
        "fileId": file.file.id,
        "sizeBytes": file.file.size_bytes,
        "mimeType": file.file.mime_type,
    }));

    if let Some(task) = &task {
        activity = activity.task(task.id).team(task.team_id);
    }

    Activity::append(&mut *tx, activity).await?;

    tx.commit().await?;

    info!(file_id = %file.file.id, size_bytes = file.file.size_bytes, "File registered");
    Ok(file)
}

/// File metadata, newest first, optionally for one task
pub async fn list_files(pool: &PgPool, task_id: Option<Uuid>) -> ServiceResult<Vec<FileView>> {
    Ok(FileRecord::list(pool, task_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_size() {
        assert_eq!(validate_size(Some(1)).unwrap(), 1);
        assert_eq!(validate_size(Some(MAX_FILE_SIZE_BYTES)).unwrap(), MAX_FILE_SIZE_BYTES);
        assert!(validate_size(Some(MAX_FILE_SIZE_BYTES + 1)).is_err());
        assert!(validate_size(Some(0)).is_err());
        assert!(validate_size(Some(-4)).is_err());
        assert!(validate_size(None).is_err());
    }
}
