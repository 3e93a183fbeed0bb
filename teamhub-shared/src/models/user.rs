/// User model and database operations
///
/// Users are provisioned by the sign-in collaborator. This service reads them
/// to resolve team invitations by email and to embed author and assignee
/// summaries in responses. `User::create` exists for provisioning tools and
/// tests.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(320) NOT NULL UNIQUE,
///     role user_role NOT NULL DEFAULT 'CONTRIBUTOR',
///     avatar_url VARCHAR(1024),
///     image VARCHAR(1024),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

/// Global role of a user
///
/// | Role        | Sees all tasks | Deletes any task/team |
/// |-------------|----------------|-----------------------|
/// | ADMIN       | yes            | yes                   |
/// | COORDINATOR | yes            | own only              |
/// | CONTRIBUTOR | assigned only  | own only              |
/// | VIEWER      | assigned only  | own only              |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Coordinator,
    #[default]
    Contributor,
    Viewer,
}

impl UserRole {
    /// Converts role to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Coordinator => "COORDINATOR",
            UserRole::Contributor => "CONTRIBUTOR",
            UserRole::Viewer => "VIEWER",
        }
    }

    /// Single visibility capability: ADMIN and COORDINATOR see every task
    pub fn can_see_all(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Coordinator)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    /// Profile image supplied by the identity provider
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Compact user reference embedded in tasks, comments, activities and files
///
/// Built in SQL with `jsonb_build_object('id', .., 'name', .., 'avatarUrl', ..,
/// 'image', ..)`, so the JSON keys here must stay camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            image: user.image.clone(),
        }
    }
}

/// SQL fragment producing a [`UserSummary`] JSON object for the given alias
pub(crate) fn summary_json(alias: &str) -> String {
    format!(
        "jsonb_build_object('id', {a}.id, 'name', {a}.name, 'avatarUrl', {a}.avatar_url, 'image', {a}.image)",
        a = alias
    )
}

/// Input for provisioning a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
}

impl User {
    /// Inserts a user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists or the database fails
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, avatar_url, image, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.role)
        .bind(data.avatar_url)
        .fetch_one(executor)
        .await
    }

    /// Finds a user by email, ignoring case
    pub async fn find_by_email<'e, E>(
        executor: E,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, avatar_url, image, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "ADMIN");
        assert_eq!(UserRole::Coordinator.as_str(), "COORDINATOR");
        assert_eq!(UserRole::Contributor.as_str(), "CONTRIBUTOR");
        assert_eq!(UserRole::Viewer.as_str(), "VIEWER");
    }

    #[test]
    fn test_role_default_is_contributor() {
        assert_eq!(UserRole::default(), UserRole::Contributor);
    }

    #[test]
    fn test_can_see_all() {
        assert!(UserRole::Admin.can_see_all());
        assert!(UserRole::Coordinator.can_see_all());
        assert!(!UserRole::Contributor.can_see_all());
        assert!(!UserRole::Viewer.can_see_all());
    }

    #[test]
    fn test_role_serde_matches_as_str() {
        for role in [
            UserRole::Admin,
            UserRole::Coordinator,
            UserRole::Contributor,
            UserRole::Viewer,
        ] {
            let json = serde_json::to_value(role).unwrap();
            assert_eq!(json, role.as_str());
        }
    }

    #[test]
    fn test_summary_json_keys_match_serde() {
        let sql = summary_json("u");
        assert!(sql.contains("'avatarUrl', u.avatar_url"));

        let summary: UserSummary = serde_json::from_value(serde_json::json!({
            "id": Uuid::nil(),
            "name": "Maya",
            "avatarUrl": null,
            "image": "https://img.example/maya.png"
        }))
        .unwrap();
        assert_eq!(summary.name, "Maya");
        assert_eq!(summary.image.as_deref(), Some("https://img.example/maya.png"));
    }
}
