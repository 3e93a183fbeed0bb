/// Task model and database operations
///
/// Tasks are the unit of coordination. Status moves freely between the four
/// values; there is no enforced state machine.
///
/// ```text
/// NOT_STARTED ⇄ IN_PROGRESS ⇄ BLOCKED
///        ↘          ↓          ↙
///                  DONE
/// (any status may move to any other)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(500) NOT NULL CHECK (length(title) > 0),
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'NOT_STARTED',
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     category task_category NOT NULL DEFAULT 'OTHER',
///     due_date DATE,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_by UUID NOT NULL REFERENCES users(id),
///     team_id UUID REFERENCES teams(id) ON DELETE SET NULL,
///     parent_task_id UUID REFERENCES tasks(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use teamhub_shared::models::task::{CreateTask, Task, TaskPriority};
/// use teamhub_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Draft newsletter".to_string(),
///     priority: TaskPriority::High,
///     created_by: Uuid::new_v4(),
///     ..CreateTask::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::user::{summary_json, UserSummary};

/// Task progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "NOT_STARTED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Blocked => "BLOCKED",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }
}

/// Area of nonprofit work a task belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    Fundraising,
    Outreach,
    Program,
    Research,
    Admin,
    #[default]
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Fundraising => "FUNDRAISING",
            TaskCategory::Outreach => "OUTREACH",
            TaskCategory::Program => "PROGRAM",
            TaskCategory::Research => "RESEARCH",
            TaskCategory::Admin => "ADMIN",
            TaskCategory::Other => "OTHER",
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,

    #[serde(rename = "createdById")]
    pub created_by: Uuid,

    pub team_id: Option<Uuid>,
    pub parent_task_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task joined with its people and comment count, as shown in lists and detail
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,

    pub assignee: Option<Json<UserSummary>>,

    #[serde(rename = "createdBy")]
    pub creator: Json<UserSummary>,

    pub comment_count: i64,
}

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Uuid>,
    pub created_by: Uuid,
    pub team_id: Option<Uuid>,
    pub parent_task_id: Option<Uuid>,
}

/// Partial update
///
/// `None` leaves a field untouched. For nullable columns `Some(None)` clears
/// the value and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub due_date: Option<Option<NaiveDate>>,
    pub assignee_id: Option<Option<Uuid>>,
}

impl UpdateTask {
    /// Names of the fields present in this update, in camelCase
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.category.is_some() {
            fields.push("category");
        }
        if self.due_date.is_some() {
            fields.push("dueDate");
        }
        if self.assignee_id.is_some() {
            fields.push("assigneeId");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

/// List filters; all optional and ANDed
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub assignee_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Open tasks due in the next seven days
    pub due_this_week: i64,
    pub in_progress: i64,
    /// Tasks in DONE last touched since the start of the current month
    pub completed_this_month: i64,
    pub blocked: i64,
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, category, due_date, \
     assignee_id, created_by, team_id, parent_task_id, created_at, updated_at";

fn view_query() -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT t.id, t.title, t.description, t.status, t.priority, t.category, t.due_date, \
         t.assignee_id, t.created_by, t.team_id, t.parent_task_id, t.created_at, t.updated_at, \
         CASE WHEN a.id IS NULL THEN NULL ELSE ",
    );
    query.push(summary_json("a"));
    query.push(" END AS assignee, ");
    query.push(summary_json("c"));
    query.push(
        " AS creator, \
         (SELECT COUNT(*) FROM comments cm WHERE cm.task_id = t.id) AS comment_count \
         FROM tasks t \
         LEFT JOIN users a ON a.id = t.assignee_id \
         JOIN users c ON c.id = t.created_by \
         WHERE TRUE",
    );
    query
}

impl Task {
    /// Inserts a task
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced user, team or parent task does not
    /// exist (foreign key violation) or the database fails
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"
            INSERT INTO tasks (title, description, status, priority, category, due_date,
                               assignee_id, created_by, team_id, parent_task_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.category)
            .bind(data.due_date)
            .bind(data.assignee_id)
            .bind(data.created_by)
            .bind(data.team_id)
            .bind(data.parent_task_id)
            .fetch_one(executor)
            .await
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Finds a task by ID and locks the row until the transaction ends
    ///
    /// Concurrent updates to the same task serialize on this lock, so each
    /// one reads the status the previous one committed.
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1 FOR UPDATE", TASK_COLUMNS);

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Applies a partial update and bumps `updated_at`
    ///
    /// Returns the updated task, or None if it doesn't exist.
    pub async fn apply_update<'e, E>(
        executor: E,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = &data.title {
            query.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &data.description {
            query.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(priority) = data.priority {
            query.push(", priority = ").push_bind(priority);
        }
        if let Some(category) = data.category {
            query.push(", category = ").push_bind(category);
        }
        if let Some(due_date) = data.due_date {
            query.push(", due_date = ").push_bind(due_date);
        }
        if let Some(assignee_id) = data.assignee_id {
            query.push(", assignee_id = ").push_bind(assignee_id);
        }

        query.push(" WHERE id = ").push_bind(id);
        query.push(" RETURNING ").push(TASK_COLUMNS);

        query.build_query_as::<Task>().fetch_optional(executor).await
    }

    /// Deletes a task
    ///
    /// Comments cascade; activities, files and subtasks keep their rows with
    /// the task link cleared.
    ///
    /// Returns true if a row was deleted
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads a task with its assignee, creator and comment count
    pub async fn find_view<'e, E>(executor: E, id: Uuid) -> Result<Option<TaskView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = view_query();
        query.push(" AND t.id = ").push_bind(id);

        query.build_query_as::<TaskView>().fetch_optional(executor).await
    }

    /// Lists tasks matching the filter, newest first
    pub async fn list<'e, E>(executor: E, filter: &TaskFilter) -> Result<Vec<TaskView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = view_query();

        if let Some(status) = filter.status {
            query.push(" AND t.status = ").push_bind(status);
        }
        if let Some(category) = filter.category {
            query.push(" AND t.category = ").push_bind(category);
        }
        if let Some(assignee_id) = filter.assignee_id {
            query.push(" AND t.assignee_id = ").push_bind(assignee_id);
        }
        if let Some(team_id) = filter.team_id {
            query.push(" AND t.team_id = ").push_bind(team_id);
        }

        query.push(" ORDER BY t.created_at DESC, t.id DESC");

        query.build_query_as::<TaskView>().fetch_all(executor).await
    }

    /// Dashboard counters, optionally restricted to one assignee
    pub async fn dashboard_stats<'e, E>(
        executor: E,
        assignee_id: Option<Uuid>,
    ) -> Result<DashboardStats, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                COUNT(*) FILTER (
                    WHERE due_date >= CURRENT_DATE
                      AND due_date < CURRENT_DATE + 7
                      AND status <> 'DONE'
                ) AS due_this_week,
                COUNT(*) FILTER (WHERE status = 'IN_PROGRESS') AS in_progress,
                COUNT(*) FILTER (
                    WHERE status = 'DONE'
                      AND updated_at >= date_trunc('month', NOW())
                ) AS completed_this_month,
                COUNT(*) FILTER (WHERE status = 'BLOCKED') AS blocked
            FROM tasks
            WHERE ($1::uuid IS NULL OR assignee_id = $1)
            "#,
        )
        .bind(assignee_id)
        .fetch_one(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::NotStarted);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(TaskCategory::default(), TaskCategory::Other);

        let data = CreateTask::default();
        assert_eq!(data.status, TaskStatus::NotStarted);
        assert!(data.assignee_id.is_none());
    }

    #[test]
    fn test_enum_serde_matches_as_str() {
        for status in [
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        for priority in [
            TaskPriority::Low,
            TaskPriority::Medium,
            TaskPriority::High,
            TaskPriority::Urgent,
        ] {
            assert_eq!(serde_json::to_value(priority).unwrap(), priority.as_str());
        }
        for category in [TaskCategory::Fundraising, TaskCategory::Research, TaskCategory::Other] {
            assert_eq!(serde_json::to_value(category).unwrap(), category.as_str());
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_str::<TaskStatus>("\"ARCHIVED\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_update_changed_fields() {
        assert!(UpdateTask::default().is_empty());

        let update = UpdateTask {
            priority: Some(TaskPriority::Urgent),
            assignee_id: Some(None),
            ..UpdateTask::default()
        };

        assert!(!update.is_empty());
        assert_eq!(update.changed_fields(), vec!["priority", "assigneeId"]);
    }

    #[test]
    fn test_task_serializes_created_by_id() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "Draft newsletter".to_string(),
            description: None,
            status: TaskStatus::NotStarted,
            priority: TaskPriority::High,
            category: TaskCategory::Outreach,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 15),
            assignee_id: None,
            created_by: Uuid::new_v4(),
            team_id: None,
            parent_task_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["createdById"], task.created_by.to_string());
        assert_eq!(json["dueDate"], "2026-03-15");
        assert_eq!(json["priority"], "HIGH");
    }
}
