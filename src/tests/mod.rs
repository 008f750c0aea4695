//! Integration and unit tests for the Kolomoni backend.
//!
//! ## Test Modules
//!
//! - **common**: in-memory database and router harness
//! - **users_api_tests**: registration, login, accounts and role assignment
//! - **roles_api_tests**: role management and permission checks
//! - **entries_api_tests**: entries, language views and everything attached to entries
//! - **categories_api_tests**: categories and translation states
//! - **search_api_tests**: quick/full search and browsing
//! - **health_api_tests**: service endpoints and response headers
//! - **db_tests**: schema, cascades and bootstrap
//! - **config_tests**: configuration defaults, files and validation
//! - **error_tests**: error mapping and validation helpers

pub mod common;

pub mod config_tests;
pub mod db_tests;
pub mod health_api_tests;
pub mod roles_api_tests;
pub mod search_api_tests;
