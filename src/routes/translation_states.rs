use axum::{extract::State, http::StatusCode};

use crate::{
    auth::permissions,
    dal::{self, events},
    error::{validation, AppError, AppResult, OptionExt},
    extract::{Json, Path, Query},
    middleware::CurrentUser,
    pagination::PageQuery,
    state::AppState,
    types::{Message, TranslationState, TranslationStateCreate, TranslationStateList},
};

pub async fn create_state(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<TranslationStateCreate>,
) -> AppResult<(StatusCode, Json<TranslationState>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    let label = validation::required_text(&body.label, "label")?;

    let mut tx = state.db.begin().await?;
    let created = dal::translation_states::create_state(&mut tx, &label).await?;
    events::record(&mut tx, Some(caller.actor()), "translation_states", "create", created.id).await?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_states(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<TranslationStateList>> {
    let mut conn = state.db.acquire().await?;
    let (translation_states, full_count) = dal::translation_states::list_states(&mut conn, state.page(&page)).await?;
    Ok(Json(TranslationStateList { translation_states, full_count }))
}

pub async fn get_state(
    State(state): State<AppState>,
    Path(state_id): Path<i64>,
) -> AppResult<Json<TranslationState>> {
    let mut conn = state.db.acquire().await?;
    let found = dal::translation_states::get_state(&mut conn, state_id).await?.ok_or_not_found("Translation state")?;
    Ok(Json(found))
}

/// Translations in this state keep existing without one.
pub async fn delete_state(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(state_id): Path<i64>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    if !dal::translation_states::delete_state(&mut tx, state_id).await? {
        return Err(AppError::NotFound("Translation state not found".to_string()));
    }
    events::record(&mut tx, Some(caller.actor()), "translation_states", "delete", state_id).await?;
    tx.commit().await?;
    Ok(Json(Message::new("Translation state deleted")))
}
