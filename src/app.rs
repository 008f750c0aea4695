use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::CorsConfig;
use crate::middleware;
use crate::routes::{self, TOTAL_COUNT_HEADER};
use crate::state::{AppState, LOGIN_ENDPOINT};

/// Request bodies are small JSON documents.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

fn cors_layer(cfg: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([HeaderName::from_static(TOTAL_COUNT_HEADER)])
        .allow_credentials(true)
}

/// Builds the full API router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    let cfg = state.config.clone();

    Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/check", get(routes::health::check))
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/metrics", get(routes::health::metrics))
        .route("/version", get(routes::health::version))
        // Users and roles
        .route("/v1/users", get(routes::users::list_users).post(routes::users::create_user))
        .route(LOGIN_ENDPOINT, post(routes::users::login))
        .route("/v1/users/me", get(routes::users::me))
        .route("/v1/users/me/perms", get(routes::users::my_permissions))
        .route(
            "/v1/users/{id}",
            get(routes::users::get_user).put(routes::users::update_user).delete(routes::users::delete_user),
        )
        .route(
            "/v1/users/{id}/roles",
            get(routes::users::user_roles)
                .post(routes::users::add_user_roles)
                .delete(routes::users::remove_user_roles),
        )
        .route("/v1/roles", get(routes::roles::list_roles).post(routes::roles::create_role))
        .route(
            "/v1/roles/{id}",
            get(routes::roles::get_role).put(routes::roles::update_role).delete(routes::roles::delete_role),
        )
        // Entries
        .route("/v1/lex/entries", post(routes::entries::create_entry))
        .route(
            "/v1/lex/entries/{id}",
            get(routes::entries::get_entry).put(routes::entries::update_entry).delete(routes::entries::delete_entry),
        )
        .route(
            "/v1/lex/entries/{id}/links",
            get(routes::entries::list_links).post(routes::entries::create_link),
        )
        .route(
            "/v1/lex/entries/{id}/links/{link_id}",
            axum::routing::put(routes::entries::update_link).delete(routes::entries::delete_link),
        )
        .route("/v1/lex/entries/{id}/suggestions", get(routes::entries::list_suggestions))
        .route("/v1/lex/entries/{id}/suggest", post(routes::entries::suggest))
        .route("/v1/lex/entries/{id}/suggest/{child_id}", delete(routes::entries::remove_suggestion))
        .route(
            "/v1/lex/entries/{id}/translate",
            post(routes::entries::translate).delete(routes::entries::remove_translation),
        )
        .route("/v1/lex/entries/{id}/relate", post(routes::entries::relate))
        .route("/v1/lex/entries/{id}/relate/{related_id}", delete(routes::entries::remove_relation))
        .route(
            "/v1/lex/entries/{id}/categories/{category_id}",
            post(routes::entries::add_to_category).delete(routes::entries::remove_from_category),
        )
        // Language views
        .route(
            "/v1/lex/english",
            get(routes::languages::list_english).post(routes::languages::create_english),
        )
        .route(
            "/v1/lex/english/{id}",
            get(routes::languages::get_english)
                .put(routes::languages::update_english)
                .delete(routes::languages::delete_english),
        )
        .route(
            "/v1/lex/slovene",
            get(routes::languages::list_slovene).post(routes::languages::create_slovene),
        )
        .route(
            "/v1/lex/slovene/{id}",
            get(routes::languages::get_slovene)
                .put(routes::languages::update_slovene)
                .delete(routes::languages::delete_slovene),
        )
        // Vocabularies
        .route(
            "/v1/lex/categories",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route(
            "/v1/lex/categories/{id}",
            get(routes::categories::get_category)
                .put(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        )
        .route("/v1/lex/categories/{id}/entries", get(routes::categories::category_entries))
        .route(
            "/v1/lex/translation_state",
            get(routes::translation_states::list_states).post(routes::translation_states::create_state),
        )
        .route(
            "/v1/lex/translation_state/{id}",
            get(routes::translation_states::get_state).delete(routes::translation_states::delete_state),
        )
        // Lookups
        .route("/v1/lex/search/quick", get(routes::search::quick_search))
        .route("/v1/lex/search/full", get(routes::search::full_search))
        .route("/v1/lex/other/orphans", get(routes::browse::orphans))
        .route("/v1/lex/other/recent", get(routes::browse::recent))
        .route("/v1/events", get(routes::events::list_events))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit::rate_limit_middleware))
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg.clone(), middleware::security_headers::security_headers_middleware))
        .layer(cors_layer(&cfg.cors))
}
