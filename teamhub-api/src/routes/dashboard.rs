/// Dashboard counters
///
/// ```text
/// GET /v1/dashboard
/// ```
///
/// ```json
/// { "dueThisWeek": 3, "inProgress": 5, "completedThisMonth": 12, "blocked": 1 }
/// ```
///
/// Counts cover only the tasks the caller can see.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use teamhub_shared::{
    auth::middleware::AuthContext, models::task::DashboardStats, services::tasks,
};

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(tasks::dashboard(&state.db, &auth).await?))
}
