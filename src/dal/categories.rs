use sqlx::SqliteConnection;

use crate::pagination::Page;
use crate::types::{Category, EntryMinimal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySort {
    #[default]
    Name,
    Id,
}

impl CategorySort {
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("name") => Some(CategorySort::Name),
            Some("id") => Some(CategorySort::Id),
            Some(_) => None,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            CategorySort::Name => "name COLLATE NOCASE ASC, id ASC",
            CategorySort::Id => "id ASC",
        }
    }
}

/// True when a category with the same name and description already exists.
/// `IS` makes two missing descriptions compare equal.
pub async fn is_duplicate(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
    excluding: Option<i64>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM categories WHERE name = ?1 AND description IS ?2 AND id IS NOT ?3)",
    )
    .bind(name)
    .bind(description)
    .bind(excluding)
    .fetch_one(&mut *conn)
    .await
}

pub async fn create_category(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
) -> sqlx::Result<Category> {
    let id = sqlx::query("INSERT INTO categories (name, description) VALUES (?1, ?2)")
        .bind(name)
        .bind(description)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    Ok(Category { id, name: name.to_string(), description: description.map(str::to_string) })
}

pub async fn get_category(conn: &mut SqliteConnection, category_id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories WHERE id = ?1")
        .bind(category_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn list_categories(
    conn: &mut SqliteConnection,
    sort: CategorySort,
    page: Page,
) -> sqlx::Result<(Vec<Category>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories").fetch_one(&mut *conn).await?;
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT id, name, description FROM categories ORDER BY {} LIMIT ?1 OFFSET ?2",
        sort.order_by()
    ))
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;
    Ok((categories, count))
}

pub async fn list_entries(
    conn: &mut SqliteConnection,
    category_id: i64,
    page: Page,
) -> sqlx::Result<(Vec<EntryMinimal>, i64)> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category_to_entry WHERE category_id = ?1")
        .bind(category_id)
        .fetch_one(&mut *conn)
        .await?;
    let entries = sqlx::query_as::<_, EntryMinimal>(
        "SELECT e.id, e.lemma, e.description, e.language FROM entries e
         JOIN category_to_entry ce ON ce.entry_id = e.id
         WHERE ce.category_id = ?1
         ORDER BY e.lemma COLLATE NOCASE, e.id
         LIMIT ?2 OFFSET ?3",
    )
    .bind(category_id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;
    Ok((entries, count))
}

pub async fn update_category(
    conn: &mut SqliteConnection,
    category_id: i64,
    name: Option<&str>,
    description: Option<Option<&str>>,
) -> sqlx::Result<Option<Category>> {
    let result = sqlx::query(
        "UPDATE categories SET name = COALESCE(?2, name), description = CASE WHEN ?3 THEN ?4 ELSE description END
         WHERE id = ?1",
    )
    .bind(category_id)
    .bind(name)
    .bind(description.is_some())
    .bind(description.flatten())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_category(conn, category_id).await
}

/// Memberships cascade.
pub async fn delete_category(conn: &mut SqliteConnection, category_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?1").bind(category_id).execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}
