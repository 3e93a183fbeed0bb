/// Activity feed endpoint
///
/// ```text
/// GET /v1/activities?limit=20&taskId=&teamId=
/// ```
///
/// Newest first. `limit` defaults to 20 and is clamped to 1..=100.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use teamhub_shared::{
    auth::middleware::AuthContext, models::activity::ActivityEntry, services::activity,
};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    pub limit: Option<i64>,
    pub task_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

pub async fn list_activities(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityEntry>>> {
    let entries =
        activity::recent_activity(&state.db, &auth, query.task_id, query.team_id, query.limit)
            .await?;
    Ok(Json(entries))
}
