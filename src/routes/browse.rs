use axum::extract::State;
use serde::Deserialize;

use crate::{
    dal::{
        self,
        browse::{OrphanOrder, RecentOrder},
    },
    error::AppResult,
    extract::{Json, Query},
    state::AppState,
    types::RecentEntry,
};

const DEFAULT_COUNT: i64 = 10;
const MAX_COUNT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub order: Option<String>,
}

impl BrowseQuery {
    fn count(&self) -> i64 {
        self.count.unwrap_or(DEFAULT_COUNT).clamp(1, MAX_COUNT)
    }
}

/// Entries with no translation on either side.
pub async fn orphans(State(state): State<AppState>, Query(q): Query<BrowseQuery>) -> AppResult<Json<Vec<RecentEntry>>> {
    let mut conn = state.db.acquire().await?;
    let entries = dal::browse::orphans(&mut conn, OrphanOrder::parse(q.order.as_deref()), q.count()).await?;
    Ok(Json(entries))
}

pub async fn recent(State(state): State<AppState>, Query(q): Query<BrowseQuery>) -> AppResult<Json<Vec<RecentEntry>>> {
    let mut conn = state.db.acquire().await?;
    let entries = dal::browse::recent(&mut conn, RecentOrder::parse(q.order.as_deref()), q.count()).await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_defaults_and_clamps() {
        assert_eq!(BrowseQuery::default().count(), 10);
        assert_eq!(BrowseQuery { count: Some(0), order: None }.count(), 1);
        assert_eq!(BrowseQuery { count: Some(500), order: None }.count(), 100);
        assert_eq!(BrowseQuery { count: Some(42), order: None }.count(), 42);
    }
}
