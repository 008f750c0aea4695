//! HTTP route handlers for the Kolomoni API.
//!
//! - `health`: liveness, readiness, version, metrics and the ping/check endpoints
//! - `users`, `roles`: accounts, login and permission roles
//! - `entries`: lexicon entries and what hangs off them (links, suggestions,
//!   translations, relations, category membership)
//! - `languages`: the `/english` and `/slovene` views over entries
//! - `categories`, `translation_states`: lexicon vocabularies
//! - `search`, `browse`: lookups, orphans and recent changes
//! - `events`: the audit log

pub mod browse;
pub mod categories;
pub mod entries;
pub mod events;
pub mod health;
pub mod languages;
pub mod roles;
pub mod search;
pub mod translation_states;
pub mod users;

use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;

pub(crate) const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// A JSON array body with the unpaginated total in `X-Total-Count`.
pub(crate) fn with_total_count<T: Serialize>(items: Vec<T>, total: i64) -> Response {
    let mut response = Json(items).into_response();
    if let Ok(value) = HeaderValue::from_str(&total.to_string()) {
        response.headers_mut().insert(HeaderName::from_static(TOTAL_COUNT_HEADER), value);
    }
    response
}

/// Maps a unique-constraint failure to 409 with a specific message.
pub(crate) fn conflict_on_duplicate(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict(message.to_string()),
        _ => AppError::from(err),
    }
}
