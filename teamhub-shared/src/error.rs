/// Error taxonomy for core operations
///
/// Every service function returns `ServiceResult<T>`. Each variant is a
/// terminal outcome for the request; nothing here is retried.
///
/// # Example
///
/// ```
/// use teamhub_shared::error::ServiceError;
///
/// let err = ServiceError::validation("title", "Title is required");
/// assert_eq!(err.kind(), "validation_error");
/// assert_eq!(err.to_string(), "Title is required");
/// ```

use crate::auth::authorization::AuthzError;
use crate::money::MoneyError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Core operation failure
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed required field
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Referenced task, campaign, team or user does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate team membership
    #[error("{0}")]
    Conflict(String),

    /// Role or ownership check failed
    #[error("{0}")]
    Forbidden(String),

    /// Storage failure; the surrounding transaction has been rolled back
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    /// Builds a validation error for a named request field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Builds a not-found error for a resource kind ("Task", "Campaign", ...)
    pub fn not_found(resource: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", resource))
    }

    /// Stable machine-readable classification
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation { .. } => "validation_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Database(_) => "internal_error",
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        ServiceError::Forbidden(err.to_string())
    }
}

impl From<MoneyError> for ServiceError {
    fn from(err: MoneyError) -> Self {
        ServiceError::validation("amount", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinct() {
        let kinds = [
            ServiceError::validation("name", "Name is required").kind(),
            ServiceError::not_found("Task").kind(),
            ServiceError::Conflict("Already a member".to_string()).kind(),
            ServiceError::Forbidden("Forbidden".to_string()).kind(),
            ServiceError::Database(sqlx::Error::RowNotFound).kind(),
        ];

        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ServiceError::not_found("Campaign").to_string(), "Campaign not found");
    }

    #[test]
    fn test_money_error_becomes_amount_validation() {
        let err: ServiceError = MoneyError::NotPositive.into();
        match err {
            ServiceError::Validation { field, .. } => assert_eq!(field, "amount"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
