/// Activity log
///
/// Append-only audit trail. Every mutating service operation writes exactly
/// one activity inside the same transaction as its primary change, so a
/// committed change always has its entry and a rolled-back change never does.
/// Nothing in this crate updates or deletes activity rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE activities (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     type activity_type NOT NULL,
///     description TEXT NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     task_id UUID REFERENCES tasks(id) ON DELETE SET NULL,
///     team_id UUID REFERENCES teams(id) ON DELETE SET NULL,
///     metadata JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::user::{summary_json, UserSummary};

/// Default page size for the activity feed
pub const DEFAULT_FEED_LIMIT: i64 = 20;

/// Upper bound on the activity feed page size
pub const MAX_FEED_LIMIT: i64 = 100;

/// Kind of recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    TaskCreated,
    TaskUpdated,
    TaskCompleted,
    TaskDeleted,
    StatusChanged,
    CommentAdded,
    FileUploaded,
    MemberJoined,
    MemberRemoved,
    TeamCreated,
    TeamDeleted,
    CampaignCreated,
    DonationRecorded,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::TaskCreated => "TASK_CREATED",
            ActivityType::TaskUpdated => "TASK_UPDATED",
            ActivityType::TaskCompleted => "TASK_COMPLETED",
            ActivityType::TaskDeleted => "TASK_DELETED",
            ActivityType::StatusChanged => "STATUS_CHANGED",
            ActivityType::CommentAdded => "COMMENT_ADDED",
            ActivityType::FileUploaded => "FILE_UPLOADED",
            ActivityType::MemberJoined => "MEMBER_JOINED",
            ActivityType::MemberRemoved => "MEMBER_REMOVED",
            ActivityType::TeamCreated => "TEAM_CREATED",
            ActivityType::TeamDeleted => "TEAM_DELETED",
            ActivityType::CampaignCreated => "CAMPAIGN_CREATED",
            ActivityType::DonationRecorded => "DONATION_RECORDED",
        }
    }
}

/// Recorded event
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub activity_type: ActivityType,

    /// Human-readable sentence, e.g. `Changed status of "Draft newsletter" to IN_PROGRESS`
    pub description: String,

    /// Actor
    pub user_id: Uuid,

    pub task_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

/// Activity joined with its actor, as shown in feeds
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub activity: Activity,

    pub user: Json<UserSummary>,
}

/// Input for appending an activity
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub description: String,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub metadata: Option<JsonValue>,
}

impl NewActivity {
    pub fn new(activity_type: ActivityType, user_id: Uuid, description: impl Into<String>) -> Self {
        Self {
            activity_type,
            description: description.into(),
            user_id,
            task_id: None,
            team_id: None,
            metadata: None,
        }
    }

    pub fn task(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn team(mut self, team_id: Option<Uuid>) -> Self {
        self.team_id = team_id;
        self
    }

    pub fn metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Feed query
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub task_id: Option<Uuid>,
    pub team_id: Option<Uuid>,

    /// Restricts the feed to the actor's own activities and activities on
    /// tasks assigned to them
    pub visible_to: Option<Uuid>,

    pub limit: i64,
}

impl Activity {
    /// Appends an activity
    ///
    /// Callers pass the open transaction so the entry commits or rolls back
    /// with the change it describes.
    pub async fn append<'e, E>(executor: E, data: NewActivity) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (type, description, user_id, task_id, team_id, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, type, description, user_id, task_id, team_id, metadata, created_at
            "#,
        )
        .bind(data.activity_type)
        .bind(data.description)
        .bind(data.user_id)
        .bind(data.task_id)
        .bind(data.team_id)
        .bind(data.metadata)
        .fetch_one(executor)
        .await
    }

    /// Recent activities with their actors, newest first
    pub async fn list_recent<'e, E>(
        executor: E,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT a.id, a.type, a.description, a.user_id, a.task_id, a.team_id, a.metadata, a.created_at, ",
        );
        query.push(summary_json("u"));
        query.push(" AS \"user\" FROM activities a JOIN users u ON u.id = a.user_id WHERE TRUE");

        if let Some(task_id) = filter.task_id {
            query.push(" AND a.task_id = ").push_bind(task_id);
        }
        if let Some(team_id) = filter.team_id {
            query.push(" AND a.team_id = ").push_bind(team_id);
        }
        if let Some(user_id) = filter.visible_to {
            query
                .push(" AND (a.user_id = ")
                .push_bind(user_id)
                .push(" OR a.task_id IN (SELECT id FROM tasks WHERE assignee_id = ")
                .push_bind(user_id)
                .push("))");
        }

        query
            .push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ")
            .push_bind(filter.limit.clamp(1, MAX_FEED_LIMIT));

        query
            .build_query_as::<ActivityEntry>()
            .fetch_all(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_type_serde_matches_as_str() {
        for kind in [
            ActivityType::TaskCreated,
            ActivityType::StatusChanged,
            ActivityType::TaskCompleted,
            ActivityType::DonationRecorded,
            ActivityType::MemberRemoved,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
    }

    #[test]
    fn test_new_activity_builder() {
        let user_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();

        let activity = NewActivity::new(ActivityType::TaskCreated, user_id, "Created task")
            .task(task_id)
            .team(None)
            .metadata(serde_json::json!({ "priority": "HIGH" }));

        assert_eq!(activity.user_id, user_id);
        assert_eq!(activity.task_id, Some(task_id));
        assert_eq!(activity.team_id, None);
        assert_eq!(activity.metadata.unwrap()["priority"], "HIGH");
    }

    #[test]
    fn test_activity_serializes_type_field() {
        let activity = Activity {
            id: Uuid::new_v4(),
            activity_type: ActivityType::StatusChanged,
            description: "Changed status".to_string(),
            user_id: Uuid::new_v4(),
            task_id: None,
            team_id: None,
            metadata: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "STATUS_CHANGED");
        assert!(json.get("userId").is_some());
    }
}
