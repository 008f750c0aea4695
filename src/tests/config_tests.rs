#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};
    use jsonwebtoken::Algorithm;
    use std::fs;
    use tempfile::NamedTempFile;

    fn write_temp_config(content: &str) -> NamedTempFile {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), content).unwrap();
        temp_file
    }

    fn validation_error(cfg: &AppConfig) -> String {
        config::validate(cfg).unwrap_err().to_string()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.url, "sqlite://data/kolomoni.db");
        assert_eq!(config.database.max_connections, 16);
        assert_eq!(config.jwt.algorithm().unwrap(), Algorithm::HS256);
        assert_eq!(config.jwt.access_token_expire_minutes, 30);
        assert_eq!(config.passwords.bcrypt_cost, 12);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:8080".to_string()]);
        assert_eq!(config.pagination.default_limit, 50);
        assert_eq!(config.pagination.max_limit, 1000);
        assert_eq!(config.rate_limit.login_max_attempts, 10);
        assert!(config.bootstrap.is_none());
        assert!(config.security.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_server_port() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(validation_error(&cfg).contains("invalid server.port"));
    }

    #[test]
    fn test_invalid_jwt_settings() {
        let mut cfg = AppConfig::default();
        cfg.jwt.secret_key = "  ".to_string();
        assert!(validation_error(&cfg).contains("jwt.secret_key"));

        let mut cfg = AppConfig::default();
        cfg.jwt.algorithm = "RS256".to_string();
        assert!(validation_error(&cfg).contains("unsupported jwt.algorithm"));

        let mut cfg = AppConfig::default();
        cfg.jwt.access_token_expire_minutes = 0;
        assert!(validation_error(&cfg).contains("access_token_expire_minutes"));
    }

    #[test]
    fn test_invalid_bcrypt_cost() {
        let mut cfg = AppConfig::default();
        cfg.passwords.bcrypt_cost = 3;
        assert!(validation_error(&cfg).contains("bcrypt_cost"));
    }

    #[test]
    fn test_invalid_pagination() {
        let mut cfg = AppConfig::default();
        cfg.pagination.default_limit = 2000;
        assert!(validation_error(&cfg).contains("default_limit"));

        let mut cfg = AppConfig::default();
        cfg.pagination.max_limit = 0;
        assert!(validation_error(&cfg).contains("max_limit"));
    }

    #[test]
    fn test_invalid_rate_limit() {
        let mut cfg = AppConfig::default();
        cfg.rate_limit.login_max_attempts = 0;
        assert!(validation_error(&cfg).contains("rate_limit"));
    }

    #[test]
    fn test_invalid_cors_origin() {
        let mut cfg = AppConfig::default();
        cfg.cors.allowed_origins = vec!["http://bad\norigin".to_string()];
        assert!(validation_error(&cfg).contains("invalid cors origin"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = write_temp_config(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [jwt]
            secret_key = "from-file"

            [bootstrap]
            admin_username = "admin"
            admin_password = "dolgo-geslo"
            "#,
        );
        let cfg = config::load_from_file(temp.path()).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.jwt.secret_key, "from-file");
        // Untouched keys keep their defaults
        assert_eq!(cfg.jwt.algorithm, "HS256");
        assert_eq!(cfg.database.url, "sqlite://data/kolomoni.db");
        assert_eq!(cfg.bootstrap.unwrap().admin_username, "admin");
    }

    #[test]
    fn test_load_from_file_validates() {
        let temp = write_temp_config(
            r#"
            [bootstrap]
            admin_username = "admin"
            admin_password = "short"
            "#,
        );
        let err = config::load_from_file(temp.path()).unwrap_err();
        assert!(err.to_string().contains("bootstrap"));
    }

    #[test]
    fn test_load_from_file_rejects_bad_types() {
        let temp = write_temp_config(
            r#"
            [server]
            port = "not-a-number"
            "#,
        );
        assert!(config::load_from_file(temp.path()).is_err());
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("kolomoni.db");
        config::ensure_sqlite_parent_dir(&format!("sqlite://{}", nested.display())).unwrap();
        assert!(nested.parent().unwrap().is_dir());

        assert!(config::ensure_sqlite_parent_dir("sqlite::memory:").is_ok());
        assert!(config::ensure_sqlite_parent_dir("postgres://localhost/db").is_ok());
    }
}
