/// Teams and membership
///
/// The creator of a team joins it as LEAD in the same transaction that
/// creates it. Members are added by email and must already be known users.

use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::{optional_text, reference_error, required_text};
use crate::auth::authorization::{assignee_scope, require_owner_or_admin};
use crate::auth::middleware::AuthContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::activity::{Activity, ActivityType, NewActivity};
use crate::models::task::{Task, TaskFilter, TaskView};
use crate::models::team::{CreateTeam, Team, TeamSummary};
use crate::models::team_member::{MemberView, TeamMember, TeamMemberRole};
use crate::models::user::User;

/// Team page: summary plus its tasks, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub summary: TeamSummary,

    pub tasks: Vec<TaskView>,
}

/// Creates a team with the caller as LEAD and logs TEAM_CREATED
pub async fn create_team(
    pool: &PgPool,
    actor: &AuthContext,
    name: Option<String>,
    description: Option<String>,
) -> ServiceResult<TeamSummary> {
    let name = required_text(name, "name", "Name")?;

    let mut tx = pool.begin().await?;

    let team = Team::create(
        &mut *tx,
        CreateTeam {
            name,
            description: optional_text(description),
            created_by: actor.user_id,
        },
    )
    .await
    .map_err(reference_error)?;

    TeamMember::create(&mut *tx, team.id, actor.user_id, TeamMemberRole::Lead).await?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::TeamCreated,
            actor.user_id,
            format!("Created team \"{}\"", team.name),
        )
        .team(Some(team.id)),
    )
    .await?;

    let summary = Team::find_summary(&mut *tx, team.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    tx.commit().await?;

    info!(team_id = %team.id, user_id = %actor.user_id, "Team created");
    Ok(summary)
}

pub async fn list_teams(pool: &PgPool) -> ServiceResult<Vec<TeamSummary>> {
    Ok(Team::list(pool).await?)
}

/// Loads a team with its members and the tasks the caller can see
pub async fn get_team(
    pool: &PgPool,
    actor: &AuthContext,
    team_id: Uuid,
) -> ServiceResult<TeamDetail> {
    let summary = Team::find_summary(pool, team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    let tasks = Task::list(
        pool,
        &TaskFilter {
            team_id: Some(team_id),
            assignee_id: assignee_scope(actor, None),
            ..TaskFilter::default()
        },
    )
    .await?;

    Ok(TeamDetail { summary, tasks })
}

/// Adds a known user to a team by email and logs MEMBER_JOINED
///
/// # Errors
///
/// - `Validation` if the email is blank
/// - `NotFound` if the team or the user does not exist
/// - `Conflict` if the user is already a member
pub async fn add_member(
    pool: &PgPool,
    actor: &AuthContext,
    team_id: Uuid,
    email: Option<String>,
    role: Option<TeamMemberRole>,
) -> ServiceResult<MemberView> {
    let email = required_text(email, "email", "Email")?;

    let mut tx = pool.begin().await?;

    let team = Team::find_by_id(&mut *tx, team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    let user = User::find_by_email(&mut *tx, &email)
        .await?
        .ok_or_else(|| ServiceError::NotFound("User not found. They must sign in first.".to_string()))?;

    let member = TeamMember::create(&mut *tx, team.id, user.id, role.unwrap_or_default())
        .await?
        .ok_or_else(|| {
            warn!(team_id = %team_id, user_id = %user.id, "Duplicate team membership");
            ServiceError::Conflict("User is already a member of this team".to_string())
        })?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::MemberJoined,
            actor.user_id,
            format!("Added {} to team \"{}\"", user.name, team.name),
        )
        .team(Some(team.id))
        .metadata(json!({ "userId": user.id, "role": member.role })),
    )
    .await?;

    let view = TeamMember::find_view(&mut *tx, team.id, user.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team member"))?;

    tx.commit().await?;

    info!(team_id = %team_id, user_id = %user.id, role = member.role.as_str(), "Member added");
    Ok(view)
}

/// Removes a member; removing a non-member succeeds and logs nothing
pub async fn remove_member(
    pool: &PgPool,
    actor: &AuthContext,
    team_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    if TeamMember::delete(&mut *tx, team_id, user_id).await? {
        let team_name = Team::find_by_id(&mut *tx, team_id)
            .await?
            .map(|team| team.name)
            .unwrap_or_default();

        Activity::append(
            &mut *tx,
            NewActivity::new(
                ActivityType::MemberRemoved,
                actor.user_id,
                format!("Removed a member from team \"{}\"", team_name),
            )
            .team(Some(team_id))
            .metadata(json!({ "userId": user_id })),
        )
        .await?;

        info!(team_id = %team_id, user_id = %user_id, "Member removed");
    }

    tx.commit().await?;
    Ok(())
}

/// Deletes a team and logs TEAM_DELETED
///
/// Memberships go with the team; its tasks stay and lose the team link.
///
/// # Errors
///
/// - `NotFound` if the team does not exist
/// - `Forbidden` unless the caller created the team or is an ADMIN
pub async fn delete_team(pool: &PgPool, actor: &AuthContext, team_id: Uuid) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let team = Team::find_by_id_for_update(&mut *tx, team_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Team"))?;

    if let Err(e) = require_owner_or_admin(actor, team.created_by, "team") {
        warn!(team_id = %team_id, user_id = %actor.user_id, "Team delete forbidden");
        return Err(e.into());
    }

    Team::delete(&mut *tx, team_id).await?;

    Activity::append(
        &mut *tx,
        NewActivity::new(
            ActivityType::TeamDeleted,
            actor.user_id,
            format!("Deleted team \"{}\"", team.name),
        )
        .metadata(json!({ "teamId": team.id, "name": team.name })),
    )
    .await?;

    tx.commit().await?;

    info!(team_id = %team_id, user_id = %actor.user_id, "Team deleted");
    Ok(())
}
