/// Task comments
///
/// Comments belong to one task and are removed with it. A reply points at a
/// parent comment on the same task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::user::{summary_json, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,

    pub author: Json<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct CreateComment {
    pub content: String,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
}

impl Comment {
    /// Inserts a comment and returns it with its author
    pub async fn create<'e, E>(executor: E, data: CreateComment) -> Result<CommentView, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO comments (content, task_id, author_id, parent_comment_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, content, task_id, author_id, parent_comment_id, created_at
            )
            SELECT i.id, i.content, i.task_id, i.author_id, i.parent_comment_id, i.created_at,
                   {} AS author
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
            summary_json("u")
        );

        sqlx::query_as::<_, CommentView>(&sql)
            .bind(data.content)
            .bind(data.task_id)
            .bind(data.author_id)
            .bind(data.parent_comment_id)
            .fetch_one(executor)
            .await
    }

    /// Whether a comment exists on the given task
    pub async fn exists_on_task<'e, E>(
        executor: E,
        comment_id: Uuid,
        task_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1 AND task_id = $2)",
        )
        .bind(comment_id)
        .bind(task_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// All comments on a task with their authors, oldest first
    pub async fn list_for_task<'e, E>(
        executor: E,
        task_id: Uuid,
    ) -> Result<Vec<CommentView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            SELECT c.id, c.content, c.task_id, c.author_id, c.parent_comment_id, c.created_at,
                   {} AS author
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
            summary_json("u")
        );

        sqlx::query_as::<_, CommentView>(&sql)
            .bind(task_id)
            .fetch_all(executor)
            .await
    }
}
