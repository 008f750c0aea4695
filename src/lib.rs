//! # Kolomoni Backend Library
//!
//! REST backend for Stari Kolomoni, an English-Slovene dictionary. Entries of
//! both languages live in one table and are tied together by translations,
//! suggestions and relations; categories, links and translation states hang
//! off them. Editors authenticate with bearer JWTs and act through roles.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server and routing
//! - **SQLx**: asynchronous SQLite access
//! - **Tokio**: async runtime
//! - **jsonwebtoken** / **bcrypt**: access tokens and password hashes
//!
//! ## Core Components
//!
//! - [`app`]: router assembly and middleware stack
//! - [`auth`]: password hashing, token issuance and permission bits
//! - [`config`]: layered configuration
//! - [`dal`]: one data-access module per resource
//! - [`db`]: schema creation and the bootstrap administrator
//! - [`error`]: error type and JSON error responses
//! - [`extract`]: request extractors that reject with JSON errors
//! - [`metrics`]: process counters
//! - [`middleware`]: authentication extractor, rate limiting, security headers
//! - [`pagination`]: skip/limit handling
//! - [`routes`]: HTTP handlers
//! - [`state`]: shared application state
//! - [`types`]: request and response types

pub mod app;
pub mod auth;
pub mod config;
pub mod dal;
pub mod db;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
