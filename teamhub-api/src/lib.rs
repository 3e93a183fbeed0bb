//! # Teamhub API Server Library
//!
//! HTTP surface for the teamhub core: task workflow, fundraising ledger,
//! teams and the activity feed.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
