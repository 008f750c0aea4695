use sqlx::SqliteConnection;

use crate::pagination::Page;
use crate::types::Event;

/// Who made a change; `None` for system writes.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub id: i64,
    pub username: &'a str,
}

pub async fn record(
    conn: &mut SqliteConnection,
    actor: Option<Actor<'_>>,
    table_name: &str,
    action: &str,
    record_id: i64,
) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO events (table_name, action, record_id, user_id, username) VALUES (?1, ?2, ?3, ?4, ?5)")
        .bind(table_name)
        .bind(action)
        .bind(record_id)
        .bind(actor.map(|a| a.id))
        .bind(actor.map(|a| a.username))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Newest first, optionally for one table.
pub async fn list_events(
    conn: &mut SqliteConnection,
    table_name: Option<&str>,
    page: Page,
) -> sqlx::Result<(Vec<Event>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE ?1 IS NULL OR table_name = ?1")
        .bind(table_name)
        .fetch_one(&mut *conn)
        .await?;
    let events = sqlx::query_as::<_, Event>(
        "SELECT id, table_name, action, record_id, user_id, username, time FROM events
         WHERE ?1 IS NULL OR table_name = ?1
         ORDER BY time DESC, id DESC
         LIMIT ?2 OFFSET ?3",
    )
    .bind(table_name)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;
    Ok((events, count))
}
