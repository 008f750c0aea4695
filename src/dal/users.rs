use sqlx::SqliteConnection;

use crate::pagination::Page;
use crate::types::{Role, User, UserCredentials, UserDetail};

const DETAIL_COLUMNS: &str = "id, username, display_name, is_active, joined, modified, last_active";

pub async fn list_users(conn: &mut SqliteConnection, page: Page) -> sqlx::Result<(Vec<User>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&mut *conn).await?;
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, display_name, is_active FROM users ORDER BY id LIMIT ?1 OFFSET ?2",
    )
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;
    Ok((users, count))
}

pub async fn get_user(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<Option<UserDetail>> {
    sqlx::query_as::<_, UserDetail>(&format!("SELECT {DETAIL_COLUMNS} FROM users WHERE id = ?1"))
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> sqlx::Result<Option<UserDetail>> {
    sqlx::query_as::<_, UserDetail>(&format!("SELECT {DETAIL_COLUMNS} FROM users WHERE username = ?1"))
        .bind(username)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn get_credentials(
    conn: &mut SqliteConnection,
    username: &str,
) -> sqlx::Result<Option<UserCredentials>> {
    sqlx::query_as::<_, UserCredentials>(
        "SELECT id, username, hashed_password FROM users WHERE username = ?1 AND is_active = 1",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn user_exists(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = ?1)")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
}

/// Inserts the user and attaches the given roles; unknown role ids are skipped.
/// A taken username surfaces as a unique violation.
pub async fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    display_name: Option<&str>,
    hashed_password: &str,
    role_ids: &[i64],
) -> sqlx::Result<UserDetail> {
    let user_id = sqlx::query("INSERT INTO users (username, display_name, hashed_password) VALUES (?1, ?2, ?3)")
        .bind(username)
        .bind(display_name)
        .bind(hashed_password)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    add_roles(conn, user_id, role_ids).await?;
    get_user(conn, user_id).await?.ok_or(sqlx::Error::RowNotFound)
}

/// Returns false when the user does not exist. `Some(None)` clears the display name.
pub async fn update_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    display_name: Option<Option<&str>>,
    hashed_password: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET
            display_name = CASE WHEN ?2 THEN ?3 ELSE display_name END,
            hashed_password = COALESCE(?4, hashed_password),
            modified = strftime('%Y-%m-%dT%H:%M:%SZ','now')
         WHERE id = ?1",
    )
    .bind(user_id)
    .bind(display_name.is_some())
    .bind(display_name.flatten())
    .bind(hashed_password)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn touch_last_active(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET last_active = strftime('%Y-%m-%dT%H:%M:%SZ','now') WHERE id = ?1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Role memberships go with the user (cascade).
pub async fn delete_user(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?1").bind(user_id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn user_roles(conn: &mut SqliteConnection, user_id: i64, page: Page) -> sqlx::Result<(Vec<Role>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_to_user WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    let roles = sqlx::query_as::<_, Role>(
        "SELECT r.id, r.name, r.permissions FROM roles r
         JOIN role_to_user ru ON ru.role_id = r.id
         WHERE ru.user_id = ?1
         ORDER BY r.id LIMIT ?2 OFFSET ?3",
    )
    .bind(user_id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;
    Ok((roles, count))
}

/// OR of the permission bits of every role the user holds.
pub async fn effective_permissions(conn: &mut SqliteConnection, user_id: i64) -> sqlx::Result<i64> {
    let bits: Vec<i64> = sqlx::query_scalar(
        "SELECT r.permissions FROM roles r JOIN role_to_user ru ON ru.role_id = r.id WHERE ru.user_id = ?1",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(bits.into_iter().fold(0, |acc, p| acc | p))
}

/// Attaches existing roles; unknown ids and existing memberships are ignored.
/// Returns how many memberships were added.
pub async fn add_roles(conn: &mut SqliteConnection, user_id: i64, role_ids: &[i64]) -> sqlx::Result<u64> {
    let mut added = 0;
    for role_id in role_ids {
        added += sqlx::query(
            "INSERT OR IGNORE INTO role_to_user (role_id, user_id) SELECT id, ?2 FROM roles WHERE id = ?1",
        )
        .bind(role_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    }
    Ok(added)
}

/// Returns how many memberships were removed.
pub async fn remove_roles(conn: &mut SqliteConnection, user_id: i64, role_ids: &[i64]) -> sqlx::Result<u64> {
    let mut removed = 0;
    for role_id in role_ids {
        removed += sqlx::query("DELETE FROM role_to_user WHERE role_id = ?1 AND user_id = ?2")
            .bind(role_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }
    Ok(removed)
}
