/// File metadata
///
/// Bytes live in external object storage; this table records where
/// (`storage_key`) and what. Files outlive the task they were attached to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::user::{summary_json, UserSummary};

/// Largest accepted upload, in bytes (10 MiB)
pub const MAX_FILE_SIZE_BYTES: i64 = 10 * 1024 * 1024;

/// MIME type recorded when the client sends none
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub filename: String,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub task_id: Option<Uuid>,

    #[serde(rename = "uploadedById")]
    pub uploaded_by: Uuid,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub file: FileRecord,

    #[serde(rename = "uploadedBy")]
    pub uploader: Json<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct CreateFile {
    pub filename: String,
    pub storage_key: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub task_id: Option<Uuid>,
    pub uploaded_by: Uuid,
}

impl FileRecord {
    /// Inserts file metadata and returns it with the uploader
    pub async fn create<'e, E>(executor: E, data: CreateFile) -> Result<FileView, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO files (filename, storage_key, mime_type, size_bytes, task_id, uploaded_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, filename, storage_key, mime_type, size_bytes, task_id, uploaded_by, created_at
            )
            SELECT i.id, i.filename, i.storage_key, i.mime_type, i.size_bytes, i.task_id,
                   i.uploaded_by, i.created_at, {} AS uploader
            FROM inserted i
            JOIN users u ON u.id = i.uploaded_by
            "#,
            summary_json("u")
        );

        sqlx::query_as::<_, FileView>(&sql)
            .bind(data.filename)
            .bind(data.storage_key)
            .bind(data.mime_type)
            .bind(data.size_bytes)
            .bind(data.task_id)
            .bind(data.uploaded_by)
            .fetch_one(executor)
            .await
    }

    /// Files, newest first, optionally for one task
    pub async fn list<'e, E>(executor: E, task_id: Option<Uuid>) -> Result<Vec<FileView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT f.id, f.filename, f.storage_key, f.mime_type, f.size_bytes, f.task_id, \
             f.uploaded_by, f.created_at, ",
        );
        query.push(summary_json("u"));
        query.push(" AS uploader FROM files f JOIN users u ON u.id = f.uploaded_by WHERE TRUE");

        if let Some(task_id) = task_id {
            query.push(" AND f.task_id = ").push_bind(task_id);
        }

        query.push(" ORDER BY f.created_at DESC, f.id DESC");

        query.build_query_as::<FileView>().fetch_all(executor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_file_size_is_ten_mebibytes() {
        assert_eq!(MAX_FILE_SIZE_BYTES, 10_485_760);
    }
}
