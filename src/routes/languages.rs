//! `/v1/lex/english` and `/v1/lex/slovene`: entries of one language.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use super::entries::{scoped_create, scoped_delete, scoped_get, scoped_update};
use crate::{
    dal::{self, entries::EntrySort},
    error::{AppError, AppResult},
    extract::{Json, Path, Query},
    middleware::CurrentUser,
    pagination::PageQuery,
    state::AppState,
    types::{Entry, EntryList, EntryPair, EntryUpdate, Language, Message, ScopedEntryCreate},
};

#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    #[serde(default)]
    pub sort: Option<String>,
}

async fn list(state: &AppState, language: Language, page: &PageQuery, sort: &SortQuery) -> AppResult<EntryList> {
    let sort = EntrySort::parse(sort.sort.as_deref())
        .ok_or_else(|| AppError::BadRequest("sort must be one of lemma, created, modified".to_string()))?;
    let mut conn = state.db.acquire().await?;
    let (entries, full_count) = dal::entries::list_by_language(&mut conn, language, sort, state.page(page)).await?;
    Ok(EntryList { entries, full_count })
}

async fn create(state: &AppState, caller: &CurrentUser, language: Language, body: ScopedEntryCreate) -> AppResult<Entry> {
    scoped_create(state, caller, language, &body.lemma, body.description.as_deref(), body.alt_form.as_deref()).await
}

pub async fn list_english(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(sort): Query<SortQuery>,
) -> AppResult<Json<EntryList>> {
    Ok(Json(list(&state, Language::English, &page, &sort).await?))
}

pub async fn create_english(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<ScopedEntryCreate>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    Ok((StatusCode::CREATED, Json(create(&state, &caller, Language::English, body).await?)))
}

pub async fn get_english(State(state): State<AppState>, Path(entry_id): Path<i64>) -> AppResult<Json<EntryPair>> {
    Ok(Json(scoped_get(&state, entry_id, Some(Language::English)).await?))
}

pub async fn update_english(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
    Json(body): Json<EntryUpdate>,
) -> AppResult<Json<Entry>> {
    Ok(Json(scoped_update(&state, &caller, entry_id, Some(Language::English), body).await?))
}

pub async fn delete_english(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<Message>> {
    Ok(Json(scoped_delete(&state, &caller, entry_id, Some(Language::English)).await?))
}

pub async fn list_slovene(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(sort): Query<SortQuery>,
) -> AppResult<Json<EntryList>> {
    Ok(Json(list(&state, Language::Slovene, &page, &sort).await?))
}

pub async fn create_slovene(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<ScopedEntryCreate>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    Ok((StatusCode::CREATED, Json(create(&state, &caller, Language::Slovene, body).await?)))
}

pub async fn get_slovene(State(state): State<AppState>, Path(entry_id): Path<i64>) -> AppResult<Json<EntryPair>> {
    Ok(Json(scoped_get(&state, entry_id, Some(Language::Slovene)).await?))
}

pub async fn update_slovene(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
    Json(body): Json<EntryUpdate>,
) -> AppResult<Json<Entry>> {
    Ok(Json(scoped_update(&state, &caller, entry_id, Some(Language::Slovene), body).await?))
}

pub async fn delete_slovene(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<Message>> {
    Ok(Json(scoped_delete(&state, &caller, entry_id, Some(Language::Slovene)).await?))
}
