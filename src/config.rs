use std::path::Path;

use jsonwebtoken::Algorithm;
use serde::Deserialize;

const DEFAULTS: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_seconds: u64,
    pub login_max_attempts: usize,
    pub login_window_seconds: u64,
}

/// Administrator account created on first start when configured.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub passwords: PasswordConfig,
    pub cors: CorsConfig,
    pub pagination: PaginationConfig,
    pub rate_limit: RateLimitConfig,
    pub bootstrap: Option<BootstrapConfig>,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // The embedded defaults are part of the binary; failing to parse them is a build defect.
        match ::config::Config::builder()
            .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
        {
            Ok(app_cfg) => app_cfg,
            Err(e) => panic!("Failed to load embedded default config: {}", e),
        }
    }
}

impl JwtConfig {
    pub fn algorithm(&self) -> anyhow::Result<Algorithm> {
        match self.algorithm.as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(anyhow::anyhow!("unsupported jwt.algorithm: {}", other)),
        }
    }
}

/// Loads configuration: embedded defaults -> kolomoni.toml -> $KOLOMONI_CONFIG -> KOLOMONI__* env.
pub fn load() -> anyhow::Result<AppConfig> {
    let _ = dotenvy::dotenv();

    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        .add_source(::config::File::with_name("kolomoni").required(false));

    if let Ok(custom_path) = std::env::var("KOLOMONI_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    builder = builder.add_source(::config::Environment::with_prefix("KOLOMONI").separator("__"));

    let app_cfg: AppConfig = builder.build()?.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

/// Loads the embedded defaults overlaid with a single TOML file, without consulting the environment.
pub fn load_from_file(path: &Path) -> anyhow::Result<AppConfig> {
    let app_cfg: AppConfig = ::config::Config::builder()
        .add_source(::config::File::from_str(DEFAULTS, ::config::FileFormat::Toml))
        .add_source(::config::File::from(path).format(::config::FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    if cfg.database.max_connections == 0 {
        return Err(anyhow::anyhow!("database.max_connections must be > 0"));
    }

    if cfg.jwt.secret_key.trim().is_empty() {
        return Err(anyhow::anyhow!("jwt.secret_key must not be empty"));
    }
    cfg.jwt.algorithm()?;
    if cfg.jwt.access_token_expire_minutes <= 0 {
        return Err(anyhow::anyhow!("jwt.access_token_expire_minutes must be > 0"));
    }
    if cfg.jwt.secret_key == "change-me-in-production" {
        tracing::warn!("jwt.secret_key is the built-in default; set KOLOMONI__JWT__SECRET_KEY");
    }

    if !(4..=31).contains(&cfg.passwords.bcrypt_cost) {
        return Err(anyhow::anyhow!("passwords.bcrypt_cost must be in 4..=31"));
    }

    for origin in &cfg.cors.allowed_origins {
        if axum::http::HeaderValue::from_str(origin).is_err() {
            return Err(anyhow::anyhow!("invalid cors origin: {}", origin));
        }
    }

    if cfg.pagination.max_limit <= 0 || cfg.pagination.max_limit > 10_000 {
        return Err(anyhow::anyhow!("pagination.max_limit must be in 1..=10000"));
    }
    if cfg.pagination.default_limit <= 0 || cfg.pagination.default_limit > cfg.pagination.max_limit {
        return Err(anyhow::anyhow!("pagination.default_limit must be in 1..=max_limit"));
    }

    if cfg.rate_limit.max_requests == 0 || cfg.rate_limit.login_max_attempts == 0 {
        return Err(anyhow::anyhow!("rate_limit request counts must be > 0"));
    }
    if cfg.rate_limit.window_seconds == 0 || cfg.rate_limit.login_window_seconds == 0 {
        return Err(anyhow::anyhow!("rate_limit windows must be > 0"));
    }

    if let Some(b) = &cfg.bootstrap {
        if b.admin_username.trim().is_empty() || b.admin_password.len() < 8 {
            return Err(anyhow::anyhow!(
                "bootstrap requires a non-empty admin_username and an admin_password of at least 8 characters"
            ));
        }
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    let Some(path) = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")) else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
