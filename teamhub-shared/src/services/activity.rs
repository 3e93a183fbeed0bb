/// Activity feed
///
/// Read side of the activity log. Callers who cannot see every task get a
/// feed limited to their own actions and to activity on tasks assigned to them.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::middleware::AuthContext;
use crate::error::ServiceResult;
use crate::models::activity::{Activity, ActivityEntry, ActivityFilter, DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT};

/// Clamps a requested page size into `1..=100`, defaulting to 20
pub fn feed_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_FEED_LIMIT)
        .clamp(1, MAX_FEED_LIMIT)
}

/// Recent activity, newest first
pub async fn recent_activity(
    pool: &PgPool,
    actor: &AuthContext,
    task_id: Option<Uuid>,
    team_id: Option<Uuid>,
    limit: Option<i64>,
) -> ServiceResult<Vec<ActivityEntry>> {
    let filter = ActivityFilter {
        task_id,
        team_id,
        visible_to: if actor.can_see_all() {
            None
        } else {
            Some(actor.user_id)
        },
        limit: feed_limit(limit),
    };

    Ok(Activity::list_recent(pool, &filter).await?)
}
