use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::middleware::rate_limit::{EndpointRateLimiter, RateLimiter};

/// Rate-limit key for the login endpoint.
pub const LOGIN_ENDPOINT: &str = "/v1/users/token";

/// The shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Signs and verifies access tokens.
    pub tokens: Arc<TokenIssuer>,
    /// Process-wide counters.
    pub metrics: Metrics,
    /// Per-IP limiter applied to every request.
    pub global_limiter: RateLimiter,
    /// Tighter per-endpoint limits (login attempts).
    pub rate_limiter: EndpointRateLimiter,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> anyhow::Result<Self> {
        let tokens = TokenIssuer::from_config(&config)?;
        let limits = &config.rate_limit;
        let global_limiter = RateLimiter::new(limits.max_requests, limits.window_seconds);
        let rate_limiter = EndpointRateLimiter::new().with_limits(vec![(
            LOGIN_ENDPOINT,
            limits.login_max_attempts,
            limits.login_window_seconds,
        )]);

        Ok(Self {
            db,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            metrics: Metrics::new(),
            global_limiter,
            rate_limiter,
        })
    }

    /// Clamps client-supplied paging to the configured bounds.
    pub fn page(&self, query: &crate::pagination::PageQuery) -> crate::pagination::Page {
        query.resolve(&self.config.pagination)
    }
}
