//! Shared harness: an in-memory database behind the full router.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

use crate::{app, auth, config::AppConfig, dal, db, state::AppState};

/// One connection that never expires, so the in-memory database lives for the whole test.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::init_db(&pool).await.unwrap();
    pool
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.passwords.bcrypt_cost = 4;
    config.jwt.secret_key = "test-secret".to_string();
    config
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn setup() -> TestApp {
    setup_with(test_config()).await
}

pub async fn setup_with(config: AppConfig) -> TestApp {
    let state = AppState::new(test_pool().await, config).unwrap();
    TestApp { router: app::build_router(state.clone()), state }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, headers, body }
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri, None, None).await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let form = format!("username={}&password={}", username, password);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/users/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        self.send(request).await
    }

    /// Creates a user holding one role with `permissions`, and returns its id and a token.
    pub async fn user_with(&self, username: &str, permissions: i64) -> (i64, String) {
        let hashed = auth::hash_password("password123".to_string(), 4).await.unwrap();
        let mut conn = self.state.db.acquire().await.unwrap();
        let role = dal::roles::create_role(&mut conn, &format!("{}-role", username), permissions).await.unwrap();
        let user = dal::users::create_user(&mut conn, username, None, &hashed, &[role.id]).await.unwrap();
        drop(conn);
        (user.id, self.state.tokens.issue(username).unwrap())
    }

    pub async fn editor(&self) -> String {
        self.user_with("editor", auth::permissions::EDIT_LEXICON).await.1
    }

    pub async fn admin(&self) -> String {
        self.user_with("admin", auth::permissions::ALL).await.1
    }

    /// Creates an entry through the API and returns its id.
    pub async fn entry(&self, token: &str, lemma: &str, language: &str) -> i64 {
        let res = self
            .call(
                Method::POST,
                "/v1/lex/entries",
                Some(token),
                Some(serde_json::json!({ "lemma": lemma, "language": language })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "creating {}: {}", lemma, res.body);
        res.body["id"].as_i64().unwrap()
    }
}
