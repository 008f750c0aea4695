#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::auth::permissions;
    use crate::tests::common::setup;

    #[tokio::test]
    async fn role_lifecycle() {
        let app = setup().await;
        let (_, token) = app.user_with("roles-admin", permissions::MANAGE_ROLES).await;

        let res = app
            .call(Method::POST, "/v1/roles", Some(&token), Some(json!({ "name": "urednik", "permissions": 1 })))
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        let id = res.body["id"].as_i64().unwrap();
        assert_eq!(res.body["permissions"], 1);

        let res = app.get(&format!("/v1/roles/{}", id)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["name"], "urednik");

        // Only the supplied field changes
        let res = app
            .call(Method::PUT, &format!("/v1/roles/{}", id), Some(&token), Some(json!({ "permissions": 3 })))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["name"], "urednik");
        assert_eq!(res.body["permissions"], 3);

        let res = app.call(Method::DELETE, &format!("/v1/roles/{}", id), Some(&token), None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(app.get(&format!("/v1/roles/{}", id)).await.status, StatusCode::NOT_FOUND);
        let res = app.call(Method::DELETE, &format!("/v1/roles/{}", id), Some(&token), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn permissions_default_to_zero() {
        let app = setup().await;
        let admin = app.admin().await;
        let res = app.call(Method::POST, "/v1/roles", Some(&admin), Some(json!({ "name": "gost" }))).await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["permissions"], 0);
    }

    #[tokio::test]
    async fn unknown_permission_bits_are_rejected() {
        let app = setup().await;
        let admin = app.admin().await;
        let res = app
            .call(Method::POST, "/v1/roles", Some(&admin), Some(json!({ "name": "x", "permissions": 64 })))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn mutations_require_manage_roles() {
        let app = setup().await;
        let (_, editor) = app.user_with("editor", permissions::EDIT_LEXICON).await;

        let res = app.call(Method::POST, "/v1/roles", None, Some(json!({ "name": "x" }))).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let res = app.call(Method::POST, "/v1/roles", Some(&editor), Some(json!({ "name": "x" }))).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);

        let res = app.call(Method::PUT, "/v1/roles/1", Some(&editor), Some(json!({ "name": "x" }))).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
        let res = app.call(Method::DELETE, "/v1/roles/1", Some(&editor), None).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn updating_missing_role_is_not_found() {
        let app = setup().await;
        let admin = app.admin().await;
        let res = app.call(Method::PUT, "/v1/roles/999", Some(&admin), Some(json!({ "name": "x" }))).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body["error"]["message"], "Role not found");
    }

    #[tokio::test]
    async fn deleting_a_role_drops_its_permissions() {
        let app = setup().await;
        let admin = app.admin().await;
        let (_, editor) = app.user_with("editor", permissions::EDIT_LEXICON).await;

        let res = app.call(Method::GET, "/v1/users/me/perms", Some(&editor), None).await;
        assert_eq!(res.body["permissions"], permissions::EDIT_LEXICON);

        // editor-role was created second, after admin-role
        let res = app.call(Method::DELETE, "/v1/roles/2", Some(&admin), None).await;
        assert_eq!(res.status, StatusCode::OK);

        let res = app.call(Method::GET, "/v1/users/me/perms", Some(&editor), None).await;
        assert_eq!(res.body["permissions"], 0);
    }

    #[tokio::test]
    async fn list_roles_reports_total() {
        let app = setup().await;
        app.admin().await;
        app.user_with("editor", permissions::EDIT_LEXICON).await;

        let res = app.get("/v1/roles?limit=1").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers.get("x-total-count").unwrap(), "2");
        assert_eq!(res.body.as_array().unwrap().len(), 1);
    }
}
