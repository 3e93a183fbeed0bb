/// Caller identity and access checks
///
/// Sign-in is handled by an external collaborator which issues HS256 tokens
/// carrying the user id and role. This module validates those tokens and
/// answers the visibility and ownership questions the services ask.
///
/// # Modules
///
/// - [`jwt`]: Token creation and validation
/// - [`middleware`]: Bearer-token extraction into an [`middleware::AuthContext`]
/// - [`authorization`]: Role visibility and owner-or-admin checks
///
/// # Example
///
/// ```
/// use teamhub_shared::auth::jwt::{create_token, validate_token, Claims};
/// use teamhub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), UserRole::Coordinator);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!")?;
/// let validated = validate_token(&token, "secret-key-at-least-32-bytes-long!")?;
/// assert_eq!(validated.role, UserRole::Coordinator);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
