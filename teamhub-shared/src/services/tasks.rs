/// Task workflow
///
/// Creates, reads, updates and deletes tasks, keeps their comment threads,
/// and logs each change to the activity log in the same transaction.
///
/// A status change is any update whose `status` differs from the stored
/// value. It is logged as TASK_COMPLETED when the new status is DONE and as
/// STATUS_CHANGED otherwise, with `{oldStatus, newStatus}` metadata. Updates
/// that leave the status alone are logged once as TASK_UPDATED with the list
/// of changed fields.
///
/// # Example
///
/// ```no_run
/// use teamhub_shared::auth::middleware::AuthContext;
/// use teamhub_shared::models::task::{TaskStatus, UpdateTask};
/// use teamhub_shared::models::user::UserRole;
/// use teamhub_shared::services::tasks::{create_task, update_task, NewTask};
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let actor = AuthContext::new(Uuid::new_v4(), UserRole::Coordinator);
///
/// let task = create_task(&pool, &actor, NewTask {
///     title: Some("Draft newsletter".to_string()),
///     ..NewTask::default()
/// }).await?;
///
/// update_task(&pool, &actor, task.task.id, UpdateTask {
///     status: Some(TaskStatus::Done),
///     ..UpdateTask::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{optional_text, reference_error, required_text};
use crate::auth::authorization::{assignee_scope, can_view_task, require_owner_or_admin};
use crate::auth::middleware::AuthContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::activity::{Activity, ActivityType, NewActivity};
use crate::models::comment::{Comment, CommentView, CreateComment};
use crate::models::task::{
    CreateTask, DashboardStats, Task, TaskCategory, TaskFilter, TaskPriority, TaskStatus,
    TaskView, UpdateTask,
};

/// Longest accepted task title, matching the column width
pub const MAX_TITLE_LENGTH: usize = 500;

/// Task creation input; only `title` is required
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub parent_task_id: Option<Uuid>,
}

/// Task with its comment thread, oldest comment first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub view: TaskView,

    pub comments: Vec<CommentView>,
}

/// A change of stored status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl StatusChange {
    /// Returns a change only when a status was requested and differs from the current one
    pub fn detect(current: TaskStatus, requested: Option<TaskStatus>) -> Option<Self> {
        match requested {
            Some(to) if to != current => Some(Self { from: current, to }),
            _ => None,
        }
    }

    pub fn activity_type(&self) -> ActivityType {
        if self.to == TaskStatus::Done {
            ActivityType::TaskCompleted
        } else {
            ActivityType::StatusChanged
        }
    }

    pub fn describe(&self, title: &str) -> String {
        format!(
            "Changed status of \"{}\" from {} to {}",
            title,
            self.from.as_str(),
            self.to.as_str()
        )
    }

    pub fn metadata(&self) -> serde_json::Value {
        json!({
            "oldStatus": self.from,
            "newStatus": self.to,
        })
    }
}

fn validate_title(title: Option<String>) -> ServiceResult<String> {
    let title = required_text(title, "title", "Title")?;
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::validation(
            "title",
            format!("Title must be at most {} characters", MAX_TITLE_LENGTH),
        ));
    }
    Ok(title)
}

/// Creates a task and logs TASK_CREATED
///
/// # Errors
///
/// - `Validation` if the title is blank or a referenced assignee, team or
///   parent task does not exist
pub async fn create_task(
    pool: &PgPool,
    actor: &AuthContext,
    input: NewTask,
) -> ServiceResult<TaskView> {
    let title = validate_title(input.title)?;

    let data = CreateTask {
        title,
        description: optional_text(input.description),
        status: input.status.unwrap_or_default(),
        priority: input.priority.unwrap_or_default(),
        category: input.category.unwrap_or_default(),
        due_date: input.due_date,
        assignee_id: input.assignee_id,
        created_by: actor.user_id,
        team_id: input.team_id,
        parent_task_id: input.parent_task_id,
    };

    let mut tx = pool.begin().await?;

    let task = Task::create(&mut *tx, data).await.map_err(reference_error)?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::TaskCreated,
            actor.user_id,
            format!("Created task \"{}\"", task.title),
        )
        .task(task.id)
        .team(task.team_id)
        .metadata(json!({
            "status": task.status,
            "priority": task.priority,
            "category": task.category,
        })),
    )
    .await?;

    let view = Task::find_view(&mut *tx, task.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;

    tx.commit().await?;

    info!(task_id = %task.id, user_id = %actor.user_id, "Task created");
    Ok(view)
}

/// Lists tasks visible to the caller, newest first
///
/// CONTRIBUTOR and VIEWER callers only ever see their own assignments; an
/// explicit assignee filter does not widen that.
pub async fn list_tasks(
    pool: &PgPool,
    actor: &AuthContext,
    filter: TaskFilter,
) -> ServiceResult<Vec<TaskView>> {
    let filter = TaskFilter {
        assignee_id: assignee_scope(actor, filter.assignee_id),
        ..filter
    };

    Ok(Task::list(pool, &filter).await?)
}

/// Loads a task the caller can see
///
/// Tasks outside the caller's visibility are reported as not found.
async fn visible_view(pool: &PgPool, actor: &AuthContext, task_id: Uuid) -> ServiceResult<TaskView> {
    let view = Task::find_view(pool, task_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;

    if !can_view_task(actor, view.task.assignee_id) {
        warn!(task_id = %task_id, user_id = %actor.user_id, "Task hidden from caller");
        return Err(ServiceError::not_found("Task"));
    }

    Ok(view)
}

/// Loads a task with its people and comment thread
pub async fn get_task(pool: &PgPool, actor: &AuthContext, task_id: Uuid) -> ServiceResult<TaskDetail> {
    let view = visible_view(pool, actor, task_id).await?;
    let comments = Comment::list_for_task(pool, task_id).await?;

    Ok(TaskDetail { view, comments })
}

/// Applies a partial update and logs it
///
/// The row is locked for the duration of the transaction, so the status
/// compared against is the one this update replaces. A requested status equal
/// to the stored one is ignored; an update left empty changes nothing and
/// logs nothing.
///
/// # Errors
///
/// - `NotFound` if the task does not exist
/// - `Validation` if a present title is blank or a referenced assignee does not exist
pub async fn update_task(
    pool: &PgPool,
    actor: &AuthContext,
    task_id: Uuid,
    mut update: UpdateTask,
) -> ServiceResult<TaskView> {
    if let Some(title) = update.title.take() {
        update.title = Some(validate_title(Some(title))?);
    }
    if let Some(description) = update.description.take() {
        update.description = Some(optional_text(description));
    }

    let mut tx = pool.begin().await?;

    let current = Task::find_by_id_for_update(&mut *tx, task_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;

    let status_change = StatusChange::detect(current.status, update.status);
    if status_change.is_none() {
        update.status = None;
    }

    if update.is_empty() {
        let view = Task::find_view(&mut *tx, task_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task"))?;
        tx.commit().await?;
        return Ok(view);
    }

    let updated = Task::apply_update(&mut *tx, task_id, &update)
        .await
        .map_err(reference_error)?
        .ok_or_else(|| ServiceError::not_found("Task"))?;

    let activity = match status_change {
        Some(change) => NewActivity::new(
            change.activity_type(),
            actor.user_id,
            change.describe(&updated.title),
        )
        .metadata(change.metadata()),
        None => NewActivity::new(
            ActivityType::TaskUpdated,
            actor.user_id,
            format!("Updated task \"{}\"", updated.title),
        )
        .metadata(json!({ "fields": update.changed_fields() })),
    };

    Activity::append(&mut *tx, activity.task(updated.id).team(updated.team_id)).await?;

    let view = Task::find_view(&mut *tx, task_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;

    tx.commit().await?;

    info!(
        task_id = %task_id,
        user_id = %actor.user_id,
        old_status = current.status.as_str(),
        new_status = updated.status.as_str(),
        "Task updated"
    );
    Ok(view)
}

/// Deletes a task and logs TASK_DELETED
///
/// Comments go with the task. The activity keeps the team link and records
/// the deleted task's id and title in metadata.
///
/// # Errors
///
/// - `NotFound` if the task does not exist
/// - `Forbidden` unless the caller created the task or is an ADMIN
pub async fn delete_task(pool: &PgPool, actor: &AuthContext, task_id: Uuid) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let task = Task::find_by_id_for_update(&mut *tx, task_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;

    if let Err(e) = require_owner_or_admin(actor, task.created_by, "task") {
        warn!(task_id = %task_id, user_id = %actor.user_id, "Task delete forbidden");
        return Err(e.into());
    }

    Task::delete(&mut *tx, task_id).await?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::TaskDeleted,
            actor.user_id,
            format!("Deleted task \"{}\"", task.title),
        )
        .team(task.team_id)
        .metadata(json!({ "taskId": task.id, "title": task.title })),
    )
    .await?;

    tx.commit().await?;

    info!(task_id = %task_id, user_id = %actor.user_id, "Task deleted");
    Ok(())
}

/// Appends a comment to a task's thread and logs COMMENT_ADDED
///
/// # Errors
///
/// - `Validation` if the content is blank
/// - `NotFound` if the task (or the parent comment on that task) does not exist
pub async fn add_comment(
    pool: &PgPool,
    actor: &AuthContext,
    task_id: Uuid,
    content: Option<String>,
    parent_comment_id: Option<Uuid>,
) -> ServiceResult<CommentView> {
    let content = required_text(content, "content", "Content")?;

    let mut tx = pool.begin().await?;

    let task = Task::find_by_id(&mut *tx, task_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task"))?;

    if let Some(parent_id) = parent_comment_id {
        if !Comment::exists_on_task(&mut *tx, parent_id, task_id).await? {
            return Err(ServiceError::not_found("Parent comment"));
        }
    }

    let comment = Comment::create(
        &mut *tx,
        CreateComment {
            content,
            task_id,
            author_id: actor.user_id,
            parent_comment_id,
        },
    )
    .await
    .map_err(reference_error)?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::CommentAdded,
            actor.user_id,
            format!("Commented on \"{}\"", task.title),
        )
        .task(task.id)
        .team(task.team_id)
        .metadata(json!({ "commentId": comment.comment.id })),
    )
    .await?;

    tx.commit().await?;

    info!(task_id = %task_id, comment_id = %comment.comment.id, "Comment added");
    Ok(comment)
}

/// Comment thread of a visible task, oldest first
pub async fn list_comments(
    pool: &PgPool,
    actor: &AuthContext,
    task_id: Uuid,
) -> ServiceResult<Vec<CommentView>> {
    visible_view(pool, actor, task_id).await?;

    Ok(Comment::list_for_task(pool, task_id).await?)
}

/// Dashboard counters over the tasks the caller can see
pub async fn dashboard(pool: &PgPool, actor: &AuthContext) -> ServiceResult<DashboardStats> {
    Ok(Task::dashboard_stats(pool, assignee_scope(actor, None)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_status_change() {
        assert_eq!(StatusChange::detect(TaskStatus::NotStarted, None), None);
        assert_eq!(
            StatusChange::detect(TaskStatus::Blocked, Some(TaskStatus::Blocked)),
            None
        );
        assert_eq!(
            StatusChange::detect(TaskStatus::NotStarted, Some(TaskStatus::InProgress)),
            Some(StatusChange {
                from: TaskStatus::NotStarted,
                to: TaskStatus::InProgress,
            })
        );
    }

    #[test]
    fn test_any_status_may_follow_any_other() {
        let all = [
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ];

        for from in all {
            for to in all {
                let change = StatusChange::detect(from, Some(to));
                assert_eq!(change.is_some(), from != to);
            }
        }
    }

    #[test]
    fn test_done_is_logged_as_completed() {
        let change = StatusChange {
            from: TaskStatus::NotStarted,
            to: TaskStatus::Done,
        };
        assert_eq!(change.activity_type(), ActivityType::TaskCompleted);

        let change = StatusChange {
            from: TaskStatus::Done,
            to: TaskStatus::InProgress,
        };
        assert_eq!(change.activity_type(), ActivityType::StatusChanged);
    }

    #[test]
    fn test_status_change_description_and_metadata() {
        let change = StatusChange {
            from: TaskStatus::NotStarted,
            to: TaskStatus::Done,
        };

        assert_eq!(
            change.describe("Draft newsletter"),
            "Changed status of \"Draft newsletter\" from NOT_STARTED to DONE"
        );
        assert_eq!(
            change.metadata(),
            json!({ "oldStatus": "NOT_STARTED", "newStatus": "DONE" })
        );
    }

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title(Some(" Draft ".into())).unwrap(), "Draft");
        assert!(validate_title(Some(String::new())).is_err());
        assert!(validate_title(None).is_err());
        assert!(validate_title(Some("x".repeat(MAX_TITLE_LENGTH + 1))).is_err());
    }
}
