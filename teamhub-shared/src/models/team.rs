/// Teams
///
/// A team groups users and tasks. Deleting a team removes its memberships
/// and leaves its tasks in place with no team.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use super::team_member::MemberView;
use super::user::{summary_json, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,

    #[serde(rename = "createdById")]
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Team with creator, members and counts, as shown in the team list
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub team: Team,

    #[serde(rename = "createdBy")]
    pub creator: Json<UserSummary>,

    pub members: Json<Vec<MemberView>>,
    pub member_count: i64,
    pub task_count: i64,
}

#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
}

fn summary_query() -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT t.id, t.name, t.description, t.created_by, t.created_at, ",
    );
    query.push(summary_json("c"));
    query.push(
        " AS creator, \
         COALESCE((\
             SELECT jsonb_agg(jsonb_build_object(\
                 'teamId', m.team_id, 'userId', m.user_id, 'role', m.role, 'joinedAt', m.joined_at, \
                 'user', jsonb_build_object('id', u.id, 'name', u.name, 'email', u.email, \
                     'role', u.role, 'avatarUrl', u.avatar_url, 'image', u.image)\
             ) ORDER BY m.joined_at ASC, m.user_id ASC) \
             FROM team_members m JOIN users u ON u.id = m.user_id \
             WHERE m.team_id = t.id\
         ), '[]'::jsonb) AS members, \
         (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count, \
         (SELECT COUNT(*) FROM tasks k WHERE k.team_id = t.id) AS task_count \
         FROM teams t \
         JOIN users c ON c.id = t.created_by \
         WHERE TRUE",
    );
    query
}

impl Team {
    pub async fn create<'e, E>(executor: E, data: CreateTeam) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Locks the team row until the transaction ends
    pub async fn find_by_id_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, created_at
            FROM teams
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_summary<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<TeamSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = summary_query();
        query.push(" AND t.id = ").push_bind(id);

        query.build_query_as::<TeamSummary>().fetch_optional(executor).await
    }

    /// All teams, newest first
    pub async fn list<'e, E>(executor: E) -> Result<Vec<TeamSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = summary_query();
        query.push(" ORDER BY t.created_at DESC, t.id DESC");

        query.build_query_as::<TeamSummary>().fetch_all(executor).await
    }

    /// Returns true if a row was deleted
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
