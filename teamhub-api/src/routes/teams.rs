/// Team endpoints
///
/// # Endpoints
///
/// - `GET /v1/teams` - List teams with members and counts
/// - `POST /v1/teams` - Create team; the caller joins as LEAD
/// - `GET /v1/teams/:id` - Team with members and tasks
/// - `DELETE /v1/teams/:id` - Delete team (creator or ADMIN)
/// - `POST /v1/teams/:id/members` - Add member by email
/// - `DELETE /v1/teams/:id/members?userId=` - Remove member

use super::SuccessResponse;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamhub_shared::{
    auth::middleware::AuthContext,
    models::{
        team::TeamSummary,
        team_member::{MemberView, TeamMemberRole},
    },
    services::teams::{self, TeamDetail},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

/// Add member request; `role` is LEAD or MEMBER and defaults to MEMBER
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    pub role: Option<TeamMemberRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMemberQuery {
    pub user_id: Option<Uuid>,
}

pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Json<Vec<TeamSummary>>> {
    Ok(Json(teams::list_teams(&state.db).await?))
}

pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<TeamSummary>)> {
    req.validate()?;

    let team = teams::create_team(&state.db, &auth, req.name, req.description).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Team with members and the tasks the caller may see
pub async fn get_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamDetail>> {
    Ok(Json(teams::get_team(&state.db, &auth, id).await?))
}

pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    teams::delete_team(&state.db, &auth, id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Adds a user who has already signed in
///
/// # Errors
///
/// - `404 Not Found`: no such team, or no user with that email
/// - `409 Conflict`: already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberView>)> {
    req.validate()?;

    let member = teams::add_member(&state.db, &auth, id, req.email, req.role).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Removes a member; removing a non-member still succeeds
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Query(query): Query<RemoveMemberQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::BadRequest("userId query parameter is required".to_string()))?;

    teams::remove_member(&state.db, &auth, id, user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_member_role() {
        let req: AddMemberRequest =
            serde_json::from_value(json!({ "email": "sam@example.org", "role": "LEAD" })).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.role, Some(TeamMemberRole::Lead));

        let result: Result<AddMemberRequest, _> =
            serde_json::from_value(json!({ "email": "sam@example.org", "role": "OWNER" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_add_member_email_format() {
        let req: AddMemberRequest = serde_json::from_value(json!({ "email": "sam" })).unwrap();
        assert!(req.validate().is_err());
    }
}
