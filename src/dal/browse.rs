use sqlx::SqliteConnection;

use crate::types::RecentEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanOrder {
    Alphabetical,
    Id,
}

impl OrphanOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("alphabetical") => OrphanOrder::Alphabetical,
            _ => OrphanOrder::Id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecentOrder {
    Created,
    Edits,
}

impl RecentOrder {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("edits") | Some("modified") => RecentOrder::Edits,
            _ => RecentOrder::Created,
        }
    }
}

/// Entries that are neither side of any translation.
pub async fn orphans(conn: &mut SqliteConnection, order: OrphanOrder, count: i64) -> sqlx::Result<Vec<RecentEntry>> {
    let order_by = match order {
        OrphanOrder::Alphabetical => "e.lemma COLLATE NOCASE, e.id",
        OrphanOrder::Id => "e.id",
    };
    sqlx::query_as::<_, RecentEntry>(&format!(
        "SELECT e.id, e.lemma, e.description, e.language, e.created, e.modified FROM entries e
         WHERE NOT EXISTS (SELECT 1 FROM translations t WHERE t.parent = e.id OR t.child = e.id)
         ORDER BY {order_by} LIMIT ?1"
    ))
    .bind(count)
    .fetch_all(&mut *conn)
    .await
}

pub async fn recent(conn: &mut SqliteConnection, order: RecentOrder, count: i64) -> sqlx::Result<Vec<RecentEntry>> {
    let order_by = match order {
        RecentOrder::Created => "created DESC, id DESC",
        RecentOrder::Edits => "COALESCE(modified, created) DESC, id DESC",
    };
    sqlx::query_as::<_, RecentEntry>(&format!(
        "SELECT id, lemma, description, language, created, modified FROM entries ORDER BY {order_by} LIMIT ?1"
    ))
    .bind(count)
    .fetch_all(&mut *conn)
    .await
}
