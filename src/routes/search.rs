use axum::extract::State;
use serde::Deserialize;

use crate::{
    dal,
    error::{AppError, AppResult},
    extract::{Json, Query},
    pagination::PageQuery,
    state::AppState,
    types::{EntryList, Language, SearchPairList},
};

const MAX_QUERY_LENGTH: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

fn search_term(q: &SearchQuery) -> AppResult<String> {
    let term = q.query.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::BadRequest("Search query must not be empty".to_string()));
    }
    if term.chars().count() > MAX_QUERY_LENGTH {
        return Err(AppError::BadRequest(format!("Search query exceeds {} characters", MAX_QUERY_LENGTH)));
    }
    Ok(term.to_string())
}

/// Lemma substring lookup, optionally within one language.
pub async fn quick_search(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<EntryList>> {
    let term = search_term(&q)?;
    let language = match q.language.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        Some(language) => Some(language.parse::<Language>().map_err(AppError::BadRequest)?),
        None => None,
    };

    state.metrics.inc_searches();
    let mut conn = state.db.acquire().await?;
    let (entries, full_count) = dal::search::quick(&mut conn, &term, language, state.page(&page)).await?;
    tracing::debug!(%term, full_count, "Quick search");
    Ok(Json(EntryList { entries, full_count }))
}

/// English/Slovene pairs where either side's lemma or description matches.
pub async fn full_search(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(q): Query<SearchQuery>,
) -> AppResult<Json<SearchPairList>> {
    let term = search_term(&q)?;

    state.metrics.inc_searches();
    let mut conn = state.db.acquire().await?;
    let (entries, full_count) = dal::search::full(&mut conn, &term, state.page(&page)).await?;
    tracing::debug!(%term, full_count, "Full search");
    Ok(Json(SearchPairList { entries, full_count }))
}
