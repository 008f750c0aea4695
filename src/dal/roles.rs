use sqlx::SqliteConnection;

use crate::pagination::Page;
use crate::types::Role;

pub async fn list_roles(conn: &mut SqliteConnection, page: Page) -> sqlx::Result<(Vec<Role>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles").fetch_one(&mut *conn).await?;
    let roles = sqlx::query_as::<_, Role>("SELECT id, name, permissions FROM roles ORDER BY id LIMIT ?1 OFFSET ?2")
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&mut *conn)
        .await?;
    Ok((roles, count))
}

pub async fn get_role(conn: &mut SqliteConnection, role_id: i64) -> sqlx::Result<Option<Role>> {
    sqlx::query_as::<_, Role>("SELECT id, name, permissions FROM roles WHERE id = ?1")
        .bind(role_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn create_role(conn: &mut SqliteConnection, name: &str, permissions: i64) -> sqlx::Result<Role> {
    let id = sqlx::query("INSERT INTO roles (name, permissions) VALUES (?1, ?2)")
        .bind(name)
        .bind(permissions)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    Ok(Role { id, name: name.to_string(), permissions })
}

/// Applies the provided fields; `None` when the role does not exist.
pub async fn update_role(
    conn: &mut SqliteConnection,
    role_id: i64,
    name: Option<&str>,
    permissions: Option<i64>,
) -> sqlx::Result<Option<Role>> {
    let result = sqlx::query(
        "UPDATE roles SET name = COALESCE(?2, name), permissions = COALESCE(?3, permissions) WHERE id = ?1",
    )
    .bind(role_id)
    .bind(name)
    .bind(permissions)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_role(conn, role_id).await
}

pub async fn delete_role(conn: &mut SqliteConnection, role_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM roles WHERE id = ?1").bind(role_id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}
