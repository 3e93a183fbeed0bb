/// Task and comment endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks?status=&category=&assigneeId=&teamId=` - List visible tasks
/// - `POST /v1/tasks` - Create task
/// - `GET /v1/tasks/:id` - Task with comments
/// - `PATCH /v1/tasks/:id` - Partial update
/// - `DELETE /v1/tasks/:id` - Delete (creator or ADMIN)
/// - `GET /v1/tasks/:id/comments` - Comment thread
/// - `POST /v1/tasks/:id/comments` - Add comment

use super::{nullable, DateInput, SuccessResponse};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamhub_shared::{
    auth::middleware::AuthContext,
    models::{
        comment::CommentView,
        task::{TaskCategory, TaskFilter, TaskPriority, TaskStatus, TaskView, UpdateTask},
    },
    services::tasks::{self, NewTask, TaskDetail},
};
use uuid::Uuid;
use validator::Validate;

/// List filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub assignee_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

impl From<ListTasksQuery> for TaskFilter {
    fn from(query: ListTasksQuery) -> Self {
        TaskFilter {
            status: query.status,
            category: query.category,
            assignee_id: query.assignee_id,
            team_id: query.team_id,
        }
    }
}

/// Create task request; only `title` is required
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub due_date: Option<DateInput>,
    pub assignee_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub parent_task_id: Option<Uuid>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            category: req.category,
            due_date: req.due_date.map(DateInput::date),
            assignee_id: req.assignee_id,
            team_id: req.team_id,
            parent_task_id: req.parent_task_id,
        }
    }
}

/// Partial update request
///
/// Absent fields are left alone. `description`, `dueDate` and `assigneeId`
/// may be sent as `null` to clear them.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(max = 500, message = "Title must be at most 500 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,

    #[serde(default, deserialize_with = "nullable")]
    pub due_date: Option<Option<DateInput>>,

    #[serde(default, deserialize_with = "nullable")]
    pub assignee_id: Option<Option<Uuid>>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            category: req.category,
            due_date: req.due_date.map(|due| due.map(DateInput::date)),
            assignee_id: req.assignee_id,
        }
    }
}

/// Add comment request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[validate(length(max = 10000, message = "Content must be at most 10000 characters"))]
    pub content: Option<String>,

    pub parent_comment_id: Option<Uuid>,
}

/// Lists tasks the caller can see, newest first
///
/// CONTRIBUTOR and VIEWER callers get only their own assignments whatever
/// `assigneeId` says.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<TaskView>>> {
    let tasks = tasks::list_tasks(&state.db, &auth, query.into()).await?;
    Ok(Json(tasks))
}

/// Creates a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Authorization: Bearer <jwt_token>
///
/// { "title": "Draft newsletter", "priority": "HIGH", "dueDate": "2026-03-15" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: blank title, or unknown assignee/team/parent
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    req.validate()?;

    let task = tasks::create_task(&state.db, &auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    Ok(Json(tasks::get_task(&state.db, &auth, id).await?))
}

/// Applies a partial update
///
/// A status change is logged as STATUS_CHANGED, or TASK_COMPLETED when the
/// new status is DONE.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskView>> {
    req.validate()?;

    let task = tasks::update_task(&state.db, &auth, id, req.into()).await?;
    Ok(Json(task))
}

/// Deletes a task
///
/// # Errors
///
/// - `403 Forbidden`: caller is neither the creator nor an ADMIN
/// - `404 Not Found`: no such task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    tasks::delete_task(&state.db, &auth, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    Ok(Json(tasks::list_comments(&state.db, &auth, id).await?))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    req.validate()?;

    let comment =
        tasks::add_comment(&state.db, &auth, id, req.content, req.parent_comment_id).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_update_request_distinguishes_null() {
        let req: UpdateTaskRequest = serde_json::from_value(json!({
            "priority": "HIGH",
            "assigneeId": null,
        }))
        .unwrap();
        let update: UpdateTask = req.into();

        assert_eq!(update.priority, Some(TaskPriority::High));
        assert_eq!(update.assignee_id, Some(None));
        assert_eq!(update.description, None);
        assert_eq!(update.title, None);
        assert_eq!(update.status, None);
    }

    #[test]
    fn test_update_request_due_date() {
        let req: UpdateTaskRequest =
            serde_json::from_value(json!({ "dueDate": "2026-04-02T09:00:00Z" })).unwrap();
        let update: UpdateTask = req.into();
        assert_eq!(update.due_date, Some(NaiveDate::from_ymd_opt(2026, 4, 2)));

        let req: UpdateTaskRequest = serde_json::from_value(json!({ "dueDate": null })).unwrap();
        let update: UpdateTask = req.into();
        assert_eq!(update.due_date, Some(None));
    }

    #[test]
    fn test_create_request() {
        let req: CreateTaskRequest = serde_json::from_value(json!({
            "title": "Draft newsletter",
            "category": "OUTREACH",
            "dueDate": "2026-03-15",
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let task: NewTask = req.into();
        assert_eq!(task.title.as_deref(), Some("Draft newsletter"));
        assert_eq!(task.category, Some(TaskCategory::Outreach));
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 3, 15));
        assert_eq!(task.status, None);
    }

    #[test]
    fn test_create_request_rejects_long_title() {
        let req = CreateTaskRequest {
            title: Some("x".repeat(501)),
            description: None,
            status: None,
            priority: None,
            category: None,
            due_date: None,
            assignee_id: None,
            team_id: None,
            parent_task_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<UpdateTaskRequest, _> =
            serde_json::from_value(json!({ "status": "ARCHIVED" }));
        assert!(result.is_err());
    }
}
