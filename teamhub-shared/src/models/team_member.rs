/// Team membership
///
/// The `(team_id, user_id)` primary key enforces at most one membership per
/// user per team. Inserts use `ON CONFLICT DO NOTHING` so that two concurrent
/// invitations for the same user resolve to one insert and one conflict.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE team_members (
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role team_member_role NOT NULL DEFAULT 'MEMBER',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::user::UserRole;

/// Role within a team, independent of the global role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_member_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamMemberRole {
    Lead,
    #[default]
    Member,
}

impl TeamMemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamMemberRole::Lead => "LEAD",
            TeamMemberRole::Member => "MEMBER",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: TeamMemberRole,
    pub joined_at: DateTime<Utc>,
}

/// Member's user record as shown on team pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub image: Option<String>,
}

/// Membership joined with the member's profile
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: TeamMemberRole,
    pub joined_at: DateTime<Utc>,
    pub user: Json<MemberProfile>,
}

impl TeamMember {
    /// Adds a membership
    ///
    /// Returns None if the user is already a member of the team.
    pub async fn create<'e, E>(
        executor: E,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamMemberRole,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (team_id, user_id) DO NOTHING
            RETURNING team_id, user_id, role, joined_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(executor)
        .await
    }

    /// Removes a membership
    ///
    /// Returns true if a row was removed; false if there was nothing to remove.
    pub async fn delete<'e, E>(executor: E, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads one membership with its profile
    pub async fn find_view<'e, E>(
        executor: E,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, MemberView>(
            r#"
            SELECT m.team_id, m.user_id, m.role, m.joined_at,
                   jsonb_build_object('id', u.id, 'name', u.name, 'email', u.email,
                                      'role', u.role, 'avatarUrl', u.avatar_url,
                                      'image', u.image) AS "user"
            FROM team_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.team_id = $1 AND m.user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_default_and_strings() {
        assert_eq!(TeamMemberRole::default(), TeamMemberRole::Member);
        assert_eq!(TeamMemberRole::Lead.as_str(), "LEAD");
        assert_eq!(serde_json::to_value(TeamMemberRole::Member).unwrap(), "MEMBER");
    }

    #[test]
    fn test_member_view_from_aggregated_json() {
        let json = serde_json::json!({
            "teamId": Uuid::nil(),
            "userId": Uuid::nil(),
            "role": "LEAD",
            "joinedAt": "2026-03-01T12:00:00.123456+00:00",
            "user": {
                "id": Uuid::nil(),
                "name": "Ana",
                "email": "ana@example.org",
                "role": "COORDINATOR",
                "avatarUrl": null,
                "image": null
            }
        });

        let view: MemberView = serde_json::from_value(json).unwrap();
        assert_eq!(view.role, TeamMemberRole::Lead);
        assert_eq!(view.user.role, UserRole::Coordinator);
        assert_eq!(view.user.email, "ana@example.org");
    }
}
