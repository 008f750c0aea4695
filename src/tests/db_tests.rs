#[cfg(test)]
mod tests {
    use crate::auth::{self, permissions};
    use crate::config::BootstrapConfig;
    use crate::dal;
    use crate::db;
    use crate::tests::common::{test_config, test_pool};
    use crate::types::Language;
    use sqlx::migrate::MigrateDatabase;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_init_db_creates_tables() {
        let pool = test_pool().await;

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        for expected in [
            "categories",
            "category_to_entry",
            "entries",
            "events",
            "links",
            "relations",
            "role_to_user",
            "roles",
            "suggestions",
            "translation_states",
            "translations",
            "users",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
        }
    }

    #[tokio::test]
    async fn test_init_db_is_idempotent() {
        let temp_db = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite:{}", temp_db.path().display());
        sqlx::Sqlite::create_database(&db_url).await.unwrap();
        let pool = SqlitePoolOptions::new().max_connections(1).connect(&db_url).await.unwrap();

        db::init_db(&pool).await.unwrap();
        sqlx::query("INSERT INTO entries (lemma, language) VALUES ('hiša', 'sl')").execute(&pool).await.unwrap();
        db::init_db(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_init_db_backfills_search_columns() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO entries (lemma, description, language) VALUES ('Šola', 'ČAS pouka', 'sl')")
            .execute(&pool)
            .await
            .unwrap();
        db::init_db(&pool).await.unwrap();

        let (lemma, description): (String, Option<String>) =
            sqlx::query_as("SELECT lemma_folded, description_folded FROM entries").fetch_one(&pool).await.unwrap();
        assert_eq!(lemma, "šola");
        assert_eq!(description.as_deref(), Some("čas pouka"));
    }

    #[tokio::test]
    async fn test_language_check_constraint() {
        let pool = test_pool().await;
        let result = sqlx::query("INSERT INTO entries (lemma, language) VALUES ('Haus', 'de')").execute(&pool).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_self_translation_is_rejected() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let entry = dal::entries::create_entry(&mut conn, "house", None, Language::English, None).await.unwrap();
        let result = sqlx::query("INSERT INTO translations (parent, child) VALUES (?1, ?1)")
            .bind(entry.id)
            .execute(&mut *conn)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_entry_delete_cascades() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let house = dal::entries::create_entry(&mut conn, "house", None, Language::English, None).await.unwrap();
        let home = dal::entries::create_entry(&mut conn, "home", None, Language::English, None).await.unwrap();
        let hisa = dal::entries::create_entry(&mut conn, "hiša", None, Language::Slovene, None).await.unwrap();
        let category = dal::categories::create_category(&mut conn, "buildings", None).await.unwrap();

        dal::entries::create_link(&mut conn, house.id, None, "https://example.com").await.unwrap();
        dal::entries::add_suggestion(&mut conn, house.id, hisa.id).await.unwrap();
        dal::entries::set_translation(&mut conn, house.id, hisa.id, None).await.unwrap();
        dal::entries::add_relation(&mut conn, house.id, home.id).await.unwrap();
        dal::entries::add_to_category(&mut conn, house.id, category.id).await.unwrap();

        assert!(dal::entries::delete_entry(&mut conn, house.id).await.unwrap());

        for table in ["links", "suggestions", "translations", "relations", "category_to_entry"] {
            let count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table)).fetch_one(&mut *conn).await.unwrap();
            assert_eq!(count, 0, "{} not cleaned up", table);
        }
        assert!(dal::categories::get_category(&mut conn, category.id).await.unwrap().is_some());
        assert!(dal::entries::load_entry(&mut conn, home.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_state_delete_nulls_translation_state() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let house = dal::entries::create_entry(&mut conn, "house", None, Language::English, None).await.unwrap();
        let hisa = dal::entries::create_entry(&mut conn, "hiša", None, Language::Slovene, None).await.unwrap();
        let draft = dal::translation_states::create_state(&mut conn, "draft").await.unwrap();
        dal::entries::set_translation(&mut conn, house.id, hisa.id, Some(draft.id)).await.unwrap();

        assert!(dal::translation_states::delete_state(&mut conn, draft.id).await.unwrap());

        let state: Option<i64> = sqlx::query_scalar("SELECT state FROM translations WHERE parent = ?1")
            .bind(house.id)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(state, None);
    }

    #[tokio::test]
    async fn test_bootstrap_admin_runs_once() {
        let pool = test_pool().await;
        let mut cfg = test_config();
        cfg.bootstrap = Some(BootstrapConfig {
            admin_username: "admin".to_string(),
            admin_password: "dolgo-geslo".to_string(),
        });

        db::bootstrap_admin(&pool, &cfg).await.unwrap();
        db::bootstrap_admin(&pool, &cfg).await.unwrap();

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
        assert_eq!(users, 1);
        let roles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles").fetch_one(&pool).await.unwrap();
        assert_eq!(roles, 1);

        let mut conn = pool.acquire().await.unwrap();
        let admin = dal::users::get_user_by_username(&mut conn, "admin").await.unwrap().unwrap();
        assert_eq!(dal::users::effective_permissions(&mut conn, admin.id).await.unwrap(), permissions::ALL);

        let found = auth::authenticate_user(&mut conn, "admin", "dolgo-geslo").await.unwrap();
        assert_eq!(found.map(|c| c.id), Some(admin.id));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_skipped_without_config() {
        let pool = test_pool().await;
        db::bootstrap_admin(&pool, &test_config()).await.unwrap();
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
        assert_eq!(users, 0);
    }
}
