/// Core operations
///
/// Each mutating function follows the same shape:
///
/// 1. validate the input against the caller and current state
/// 2. open a transaction with `pool.begin()`
/// 3. apply the primary change
/// 4. append exactly one activity with the same transaction
/// 5. commit and return the updated entity
///
/// Any `?` before `commit()` drops the transaction, which rolls back both
/// the change and its activity.
///
/// - `tasks`: Task workflow, comments and dashboard counters
/// - `ledger`: Campaigns and donations
/// - `teams`: Teams and memberships
/// - `files`: File metadata registration
/// - `activity`: Activity feed

pub mod activity;
pub mod files;
pub mod ledger;
pub mod tasks;
pub mod teams;

use crate::error::ServiceError;

/// Trims a required text field, rejecting blank values
pub(crate) fn required_text(
    value: Option<String>,
    field: &'static str,
    label: &str,
) -> Result<String, ServiceError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::validation(field, format!("{} is required", label))),
    }
}

/// Trims an optional text field; blank becomes None
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Maps a foreign key violation on insert to a validation error on the
/// offending field, or to not-found when the acting user is unknown. Other
/// errors pass through as database errors.
pub(crate) fn reference_error(err: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23503") {
            let constraint = db_err.constraint().unwrap_or_default();
            if ["created_by", "uploaded_by", "author_id", "recorded_by", "user_id"]
                .iter()
                .any(|actor_column| constraint.contains(actor_column))
            {
                return ServiceError::not_found("User");
            }

            let field = if constraint.contains("assignee") {
                "assigneeId"
            } else if constraint.contains("parent") {
                "parentTaskId"
            } else if constraint.contains("team") {
                "teamId"
            } else if constraint.contains("task") {
                "taskId"
            } else {
                "reference"
            };
            return ServiceError::validation(field, "Referenced record does not exist");
        }
    }

    ServiceError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text(Some("  Spring Drive ".into()), "name", "Name").unwrap(), "Spring Drive");

        let err = required_text(Some("   ".into()), "name", "Name").unwrap_err();
        assert_eq!(err.to_string(), "Name is required");

        assert!(required_text(None, "title", "Title").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("".into())), None);
        assert_eq!(optional_text(Some(" notes ".into())), Some("notes".to_string()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_reference_error_passes_through_other_errors() {
        let err = reference_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
