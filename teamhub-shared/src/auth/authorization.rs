/// Role visibility and ownership checks
///
/// Visibility is decided in one place: [`UserRole::can_see_all`]. ADMIN and
/// COORDINATOR see every task; CONTRIBUTOR and VIEWER see only tasks assigned
/// to them. Every task read path goes through [`assignee_scope`] or
/// [`can_view_task`] so the rule cannot drift between list and get.
///
/// Destructive operations on tasks and teams require the caller to be the
/// creator or an ADMIN.
///
/// # Example
///
/// ```
/// use teamhub_shared::auth::authorization::{assignee_scope, require_owner_or_admin};
/// use teamhub_shared::auth::middleware::AuthContext;
/// use teamhub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let me = AuthContext::new(Uuid::new_v4(), UserRole::Contributor);
/// assert_eq!(assignee_scope(&me, None), Some(me.user_id));
/// assert!(require_owner_or_admin(&me, Uuid::new_v4(), "task").is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
#[cfg(doc)]
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller neither created the resource nor is an admin
    #[error("Only the creator or an admin can delete this {0}")]
    NotOwnerOrAdmin(&'static str),
}

/// Effective assignee filter for a task query
///
/// Callers who can see everything keep whatever filter they asked for. Anyone
/// else is pinned to their own id regardless of the requested value.
pub fn assignee_scope(auth: &AuthContext, requested: Option<Uuid>) -> Option<Uuid> {
    if auth.can_see_all() {
        requested
    } else {
        Some(auth.user_id)
    }
}

/// Whether the caller may read a task with the given assignee
pub fn can_view_task(auth: &AuthContext, assignee_id: Option<Uuid>) -> bool {
    auth.can_see_all() || assignee_id == Some(auth.user_id)
}

/// Requires the caller to have created the resource or to be an ADMIN
///
/// # Errors
///
/// Returns `AuthzError::NotOwnerOrAdmin` naming the resource kind
pub fn require_owner_or_admin(
    auth: &AuthContext,
    created_by: Uuid,
    resource: &'static str,
) -> Result<(), AuthzError> {
    if auth.user_id == created_by || auth.role.is_admin() {
        return Ok(());
    }

    Err(AuthzError::NotOwnerOrAdmin(resource))
}
