use sqlx::SqlitePool;

use crate::auth::{self, permissions};
use crate::config::AppConfig;

const NOW: &str = "(strftime('%Y-%m-%dT%H:%M:%SZ','now'))";

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Cascades and dangling-reference checks depend on this
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;

    let tables = [
        format!(
            r#"CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                display_name TEXT NULL,
                hashed_password TEXT NOT NULL,
                joined TEXT NOT NULL DEFAULT {NOW},
                modified TEXT NULL,
                last_active TEXT NOT NULL DEFAULT {NOW},
                is_active INTEGER NOT NULL DEFAULT 1
            )"#
        ),
        r#"CREATE TABLE IF NOT EXISTS roles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            permissions INTEGER NOT NULL DEFAULT 0
        )"#
        .to_string(),
        r#"CREATE TABLE IF NOT EXISTS role_to_user (
            role_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            PRIMARY KEY (role_id, user_id),
            FOREIGN KEY(role_id) REFERENCES roles(id) ON DELETE CASCADE,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        )"#
        .to_string(),
        format!(
            r#"CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lemma TEXT NOT NULL,
                description TEXT NULL,
                language TEXT NOT NULL CHECK (language IN ('en', 'sl')),
                alt_form TEXT NULL,
                lemma_folded TEXT NULL,
                description_folded TEXT NULL,
                created TEXT NOT NULL DEFAULT {NOW},
                modified TEXT NULL
            )"#
        ),
        r#"CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT NULL
        )"#
        .to_string(),
        r#"CREATE TABLE IF NOT EXISTS category_to_entry (
            entry_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            PRIMARY KEY (entry_id, category_id),
            FOREIGN KEY(entry_id) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
        )"#
        .to_string(),
        r#"CREATE TABLE IF NOT EXISTS links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NULL,
            url TEXT NOT NULL,
            entry_id INTEGER NOT NULL,
            FOREIGN KEY(entry_id) REFERENCES entries(id) ON DELETE CASCADE
        )"#
        .to_string(),
        r#"CREATE TABLE IF NOT EXISTS suggestions (
            parent INTEGER NOT NULL,
            child INTEGER NOT NULL,
            PRIMARY KEY (parent, child),
            CHECK (parent <> child),
            FOREIGN KEY(parent) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY(child) REFERENCES entries(id) ON DELETE CASCADE
        )"#
        .to_string(),
        r#"CREATE TABLE IF NOT EXISTS translation_states (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            label TEXT NOT NULL
        )"#
        .to_string(),
        r#"CREATE TABLE IF NOT EXISTS translations (
            parent INTEGER PRIMARY KEY,
            child INTEGER NOT NULL,
            state INTEGER NULL,
            CHECK (parent <> child),
            FOREIGN KEY(parent) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY(child) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY(state) REFERENCES translation_states(id) ON DELETE SET NULL
        )"#
        .to_string(),
        r#"CREATE TABLE IF NOT EXISTS relations (
            entry1 INTEGER NOT NULL,
            entry2 INTEGER NOT NULL,
            PRIMARY KEY (entry1, entry2),
            CHECK (entry1 <> entry2),
            FOREIGN KEY(entry1) REFERENCES entries(id) ON DELETE CASCADE,
            FOREIGN KEY(entry2) REFERENCES entries(id) ON DELETE CASCADE
        )"#
        .to_string(),
        format!(
            r#"CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                table_name TEXT NOT NULL,
                action TEXT NOT NULL,
                record_id INTEGER NOT NULL,
                user_id INTEGER NULL,
                username TEXT NULL,
                time TEXT NOT NULL DEFAULT {NOW}
            )"#
        ),
    ];
    for ddl in &tables {
        sqlx::query(ddl).execute(pool).await?;
    }

    // Added after the first schema revision; older databases lack them
    for (column, ddl) in [
        ("alt_form", "ALTER TABLE entries ADD COLUMN alt_form TEXT NULL"),
        ("lemma_folded", "ALTER TABLE entries ADD COLUMN lemma_folded TEXT NULL"),
        ("description_folded", "ALTER TABLE entries ADD COLUMN description_folded TEXT NULL"),
    ] {
        if let Err(e) = sqlx::query(ddl).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if !msg.contains("duplicate") && !msg.contains("already exists") {
                        tracing::error!("Failed to add {} column to entries: {}", column, e);
                        return Err(anyhow::anyhow!("Migration failed: {}", e));
                    }
                }
                _ => return Err(anyhow::anyhow!("Migration failed: {}", e)),
            }
        }
    }
    backfill_folded(pool).await?;

    let indexes = [
        ("idx_entries_lemma", "CREATE INDEX IF NOT EXISTS idx_entries_lemma ON entries(lemma)"),
        ("idx_entries_language_lemma", "CREATE INDEX IF NOT EXISTS idx_entries_language_lemma ON entries(language, lemma)"),
        ("idx_entries_created", "CREATE INDEX IF NOT EXISTS idx_entries_created ON entries(created DESC)"),
        ("idx_links_entry", "CREATE INDEX IF NOT EXISTS idx_links_entry ON links(entry_id)"),
        ("idx_translations_child", "CREATE INDEX IF NOT EXISTS idx_translations_child ON translations(child)"),
        ("idx_suggestions_child", "CREATE INDEX IF NOT EXISTS idx_suggestions_child ON suggestions(child)"),
        ("idx_relations_entry2", "CREATE INDEX IF NOT EXISTS idx_relations_entry2 ON relations(entry2)"),
        ("idx_category_to_entry_category", "CREATE INDEX IF NOT EXISTS idx_category_to_entry_category ON category_to_entry(category_id)"),
        ("idx_role_to_user_user", "CREATE INDEX IF NOT EXISTS idx_role_to_user_user ON role_to_user(user_id)"),
        ("idx_events_table_time", "CREATE INDEX IF NOT EXISTS idx_events_table_time ON events(table_name, time DESC)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            tracing::warn!("Failed to create index {}: {}", name, e);
        }
    }

    Ok(())
}

/// Fills the lowercased search copies for rows written before they existed.
/// SQLite's `lower()` only folds ASCII, so the folding happens here.
async fn backfill_folded(pool: &SqlitePool) -> anyhow::Result<()> {
    let rows: Vec<(i64, String, Option<String>)> =
        sqlx::query_as("SELECT id, lemma, description FROM entries WHERE lemma_folded IS NULL")
            .fetch_all(pool)
            .await?;
    if rows.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for (id, lemma, description) in &rows {
        sqlx::query("UPDATE entries SET lemma_folded = ?2, description_folded = ?3 WHERE id = ?1")
            .bind(id)
            .bind(lemma.to_lowercase())
            .bind(description.as_deref().map(str::to_lowercase))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    tracing::info!("Backfilled search columns for {} entries", rows.len());
    Ok(())
}

/// Creates the configured administrator (and an `administrator` role with every
/// permission) unless a user with that name already exists.
pub async fn bootstrap_admin(pool: &SqlitePool, cfg: &AppConfig) -> anyhow::Result<()> {
    let Some(bootstrap) = &cfg.bootstrap else {
        return Ok(());
    };

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1)")
        .bind(&bootstrap.admin_username)
        .fetch_one(pool)
        .await?;
    if exists {
        tracing::debug!("Bootstrap admin {} already present", bootstrap.admin_username);
        return Ok(());
    }

    let hashed = auth::hash_password(bootstrap.admin_password.clone(), cfg.passwords.bcrypt_cost).await?;

    let mut tx = pool.begin().await?;
    let user_id = sqlx::query("INSERT INTO users (username, display_name, hashed_password) VALUES (?1, ?1, ?2)")
        .bind(&bootstrap.admin_username)
        .bind(&hashed)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
    let role_id = sqlx::query("INSERT INTO roles (name, permissions) VALUES ('administrator', ?1)")
        .bind(permissions::ALL)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
    sqlx::query("INSERT INTO role_to_user (role_id, user_id) VALUES (?1, ?2)")
        .bind(role_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("Created bootstrap administrator {}", bootstrap.admin_username);
    Ok(())
}
