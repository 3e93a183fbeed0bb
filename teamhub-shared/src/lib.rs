//! # Teamhub Shared Library
//!
//! Data access, core services and auth primitives shared by the Teamhub API
//! server and its integration tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `services`: Task workflow, fundraising ledger, teams, files, activity feed
//! - `auth`: Caller identity (JWT) and role-based visibility checks
//! - `db`: Connection pool and migrations
//! - `money`: Integer-cents currency conversion and formatting
//! - `error`: Service error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod money;
pub mod services;

/// Current version of the Teamhub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
