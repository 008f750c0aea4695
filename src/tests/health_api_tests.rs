#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;

    use crate::config::SecurityConfig;
    use crate::tests::common::{setup, setup_with, test_config};

    #[tokio::test]
    async fn test_ping() {
        let app = setup().await;
        let res = app.get("/ping").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["message"], "pong");
    }

    #[tokio::test]
    async fn test_check_requires_token() {
        let app = setup().await;
        assert_eq!(app.get("/check").await.status, StatusCode::UNAUTHORIZED);

        let (_, token) = app.user_with("ana", 0).await;
        let res = app.call(Method::GET, "/check", Some(&token), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["message"], "You are authorized.");
    }

    #[tokio::test]
    async fn test_healthz_and_readyz() {
        let app = setup().await;
        let res = app.get("/healthz").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, Value::String("ok".to_string()));

        let res = app.get("/readyz").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, Value::String("ready".to_string()));
    }

    #[tokio::test]
    async fn test_version() {
        let app = setup().await;
        let res = app.get("/version").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["name"], "kolomoni");
        assert_eq!(res.body["version"], env!("CARGO_PKG_VERSION"));
        assert!(res.body["build"]["profile"].is_string());
    }

    #[tokio::test]
    async fn test_metrics_snapshot() {
        let app = setup().await;
        app.get("/v1/lex/search/quick?query=x").await;
        let res = app.get("/metrics").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["searches"], 1);
        assert_eq!(res.body["entries_created"], 0);
        assert!(res.body["uptime_seconds"].is_u64());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = setup().await;
        assert_eq!(app.get("/v1/nothing-here").await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_security_headers() {
        let app = setup().await;
        let res = app.get("/ping").await;
        assert_eq!(res.headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(res.headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(res.headers.get("referrer-policy").unwrap(), "no-referrer");
        assert!(res.headers.get("strict-transport-security").is_none());
    }

    #[tokio::test]
    async fn test_optional_hsts_and_csp() {
        let mut config = test_config();
        config.security = Some(SecurityConfig {
            enable_hsts: Some(true),
            hsts_max_age: Some(600),
            hsts_include_subdomains: Some(true),
            csp: Some("default-src 'none'".to_string()),
        });
        let app = setup_with(config).await;
        let res = app.get("/ping").await;
        assert_eq!(res.headers.get("strict-transport-security").unwrap(), "max-age=600; includeSubDomains");
        assert_eq!(res.headers.get("content-security-policy").unwrap(), "default-src 'none'");
    }

    #[tokio::test]
    async fn test_cors_exposes_total_count() {
        let app = setup().await;
        let request = Request::builder()
            .method(Method::GET)
            .uri("/v1/users")
            .header(header::ORIGIN, "http://localhost:8080")
            .body(Body::empty())
            .unwrap();
        let res = app.send(request).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "http://localhost:8080");
        let exposed = res.headers.get(header::ACCESS_CONTROL_EXPOSE_HEADERS).unwrap().to_str().unwrap();
        assert!(exposed.contains("x-total-count"));
        assert_eq!(res.headers.get("x-total-count").unwrap(), "0");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = setup().await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/v1/lex/entries")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
            .body(Body::empty())
            .unwrap();
        let res = app.send(request).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let app = setup().await;
        let token = app.editor().await;
        let lemma = "a".repeat(2 * 1024 * 1024);
        let res = app
            .call(
                Method::POST,
                "/v1/lex/entries",
                Some(&token),
                Some(serde_json::json!({ "lemma": lemma, "language": "en" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(res.body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }
}
