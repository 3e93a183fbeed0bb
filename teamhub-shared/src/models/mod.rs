/// Database models for Teamhub
///
/// Each model owns its table's queries. Query functions are generic over
/// `PgExecutor`, so services can run them against the pool or inside an open
/// transaction (`&mut *tx`).
///
/// # Models
///
/// - `user`: Users and global roles (read-only here; provisioned by sign-in)
/// - `team`, `team_member`: Teams and memberships
/// - `task`, `comment`: Tasks and their discussion
/// - `activity`: Append-only audit log
/// - `file`: Uploaded file metadata
/// - `campaign`, `donation`: Fundraising ledger
///
/// `*View` types are rows joined with the people they reference and are what
/// the API returns.

pub mod activity;
pub mod campaign;
pub mod comment;
pub mod donation;
pub mod file;
pub mod task;
pub mod team;
pub mod team_member;
pub mod user;
