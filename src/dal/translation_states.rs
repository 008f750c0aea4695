use sqlx::SqliteConnection;

use crate::pagination::Page;
use crate::types::TranslationState;

pub async fn create_state(conn: &mut SqliteConnection, label: &str) -> sqlx::Result<TranslationState> {
    let id = sqlx::query("INSERT INTO translation_states (label) VALUES (?1)")
        .bind(label)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    Ok(TranslationState { id, label: label.to_string() })
}

pub async fn list_states(conn: &mut SqliteConnection, page: Page) -> sqlx::Result<(Vec<TranslationState>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM translation_states").fetch_one(&mut *conn).await?;
    let states = sqlx::query_as::<_, TranslationState>(
        "SELECT id, label FROM translation_states ORDER BY id LIMIT ?1 OFFSET ?2",
    )
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;
    Ok((states, count))
}

pub async fn get_state(conn: &mut SqliteConnection, state_id: i64) -> sqlx::Result<Option<TranslationState>> {
    sqlx::query_as::<_, TranslationState>("SELECT id, label FROM translation_states WHERE id = ?1")
        .bind(state_id)
        .fetch_optional(&mut *conn)
        .await
}

/// First state with this label; labels are not unique.
pub async fn find_by_label(conn: &mut SqliteConnection, label: &str) -> sqlx::Result<Option<TranslationState>> {
    sqlx::query_as::<_, TranslationState>(
        "SELECT id, label FROM translation_states WHERE label = ?1 ORDER BY id LIMIT 1",
    )
    .bind(label)
    .fetch_optional(&mut *conn)
    .await
}

/// Translations using the state keep their row with a NULL state.
pub async fn delete_state(conn: &mut SqliteConnection, state_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM translation_states WHERE id = ?1")
        .bind(state_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
