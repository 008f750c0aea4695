use axum::extract::State;
use serde::Deserialize;

use crate::{
    dal,
    error::AppResult,
    extract::{Json, Query},
    middleware::CurrentUser,
    pagination::PageQuery,
    state::AppState,
    types::EventList,
};

#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub table: Option<String>,
}

/// The audit log, newest first.
pub async fn list_events(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<EventFilter>,
) -> AppResult<Json<EventList>> {
    let table = filter.table.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let mut conn = state.db.acquire().await?;
    let (events, full_count) = dal::events::list_events(&mut conn, table, state.page(&page)).await?;
    Ok(Json(EventList { events, full_count }))
}
