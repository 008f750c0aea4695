//! Entry handlers for `/v1/lex/entries`.
//!
//! Every mutation requires `EDIT_LEXICON` and writes an audit event in the same
//! transaction as the change. The `scoped_*` functions are shared with the
//! language views, which pass the language an entry must have.

use axum::{extract::State, http::StatusCode};
use sqlx::SqliteConnection;

use super::conflict_on_duplicate;
use crate::{
    auth::permissions,
    dal::{self, events},
    error::{validation, AppError, AppResult, OptionExt},
    extract::{Json, Path},
    middleware::CurrentUser,
    state::AppState,
    types::{
        Entry, EntryCreate, EntryMinimal, EntryPair, EntryUpdate, Language, Link, LinkCreate, LinkUpdate, Message,
        RelationCreate, SuggestionCreate, TranslationCreate,
    },
};

fn invalid_entry() -> AppError {
    AppError::BadRequest("Invalid entry".to_string())
}

fn entry_not_found() -> AppError {
    AppError::NotFound("Entry not found".to_string())
}

/// The entry's language; 404 when it is missing or, with a scope, in the other language.
pub(crate) async fn require_entry(
    conn: &mut SqliteConnection,
    entry_id: i64,
    scope: Option<Language>,
) -> AppResult<Language> {
    match dal::entries::language_of(conn, entry_id).await? {
        Some(language) if scope.map_or(true, |s| s == language) => Ok(language),
        _ => Err(entry_not_found()),
    }
}

fn check_alt_form(language: Language, alt_form: Option<&str>) -> AppResult<()> {
    if alt_form.is_some() && language != Language::Slovene {
        return Err(AppError::ValidationError {
            field: "alt_form".to_string(),
            message: "Alternative forms are only recorded for Slovene entries".to_string(),
        });
    }
    Ok(())
}

pub(crate) async fn scoped_create(
    state: &AppState,
    caller: &CurrentUser,
    language: Language,
    lemma: &str,
    description: Option<&str>,
    alt_form: Option<&str>,
) -> AppResult<Entry> {
    caller.require(permissions::EDIT_LEXICON)?;
    let lemma = validation::required_text(lemma, "lemma").map_err(|_| invalid_entry())?;
    let description = validation::optional_text(description);
    let alt_form = validation::optional_text(alt_form);
    check_alt_form(language, alt_form.as_deref())?;

    let mut tx = state.db.begin().await?;
    let row = dal::entries::create_entry(&mut tx, &lemma, description.as_deref(), language, alt_form.as_deref()).await?;
    events::record(&mut tx, Some(caller.actor()), "entries", "create", row.id).await?;
    tx.commit().await?;

    state.metrics.inc_entries_created();
    tracing::info!(id = row.id, lemma = %row.lemma, %language, by = %caller.username(), "Entry created");
    Ok(Entry::from(row))
}

pub(crate) async fn scoped_get(state: &AppState, entry_id: i64, scope: Option<Language>) -> AppResult<EntryPair> {
    let mut conn = state.db.acquire().await?;
    require_entry(&mut conn, entry_id, scope).await?;
    dal::entries::get_pair(&mut conn, entry_id).await?.ok_or_else(entry_not_found)
}

pub(crate) async fn scoped_update(
    state: &AppState,
    caller: &CurrentUser,
    entry_id: i64,
    scope: Option<Language>,
    body: EntryUpdate,
) -> AppResult<Entry> {
    caller.require(permissions::EDIT_LEXICON)?;
    let lemma = match body.lemma.as_deref() {
        Some(lemma) => Some(validation::required_text(lemma, "lemma").map_err(|_| invalid_entry())?),
        None => None,
    };
    let description = validation::patch_text(body.description.as_deref());
    let alt_form = validation::patch_text(body.alt_form.as_deref());
    let description = description.as_ref().map(|d| d.as_deref());
    let alt_form = alt_form.as_ref().map(|a| a.as_deref());

    let mut tx = state.db.begin().await?;
    let language = require_entry(&mut tx, entry_id, scope).await?;
    check_alt_form(language, alt_form.flatten())?;
    dal::entries::update_entry(&mut tx, entry_id, lemma.as_deref(), description, alt_form).await?;
    events::record(&mut tx, Some(caller.actor()), "entries", "update", entry_id).await?;
    let entry = dal::entries::load_entry(&mut tx, entry_id).await?.ok_or_else(entry_not_found)?;
    tx.commit().await?;

    tracing::info!(id = entry_id, by = %caller.username(), "Entry updated");
    Ok(entry)
}

pub(crate) async fn scoped_delete(
    state: &AppState,
    caller: &CurrentUser,
    entry_id: i64,
    scope: Option<Language>,
) -> AppResult<Message> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, scope).await?;
    dal::entries::delete_entry(&mut tx, entry_id).await?;
    events::record(&mut tx, Some(caller.actor()), "entries", "delete", entry_id).await?;
    tx.commit().await?;

    state.metrics.inc_entries_deleted();
    tracing::info!(id = entry_id, by = %caller.username(), "Entry deleted");
    Ok(Message::new("Entry deleted"))
}

pub async fn create_entry(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<EntryCreate>,
) -> AppResult<(StatusCode, Json<Entry>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    let language: Language = body.language.parse().map_err(|_| invalid_entry())?;
    let entry =
        scoped_create(&state, &caller, language, &body.lemma, body.description.as_deref(), body.alt_form.as_deref())
            .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get_entry(State(state): State<AppState>, Path(entry_id): Path<i64>) -> AppResult<Json<EntryPair>> {
    Ok(Json(scoped_get(&state, entry_id, None).await?))
}

pub async fn update_entry(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
    Json(body): Json<EntryUpdate>,
) -> AppResult<Json<Entry>> {
    Ok(Json(scoped_update(&state, &caller, entry_id, None, body).await?))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<Message>> {
    Ok(Json(scoped_delete(&state, &caller, entry_id, None).await?))
}

// Links

pub async fn list_links(State(state): State<AppState>, Path(entry_id): Path<i64>) -> AppResult<Json<Vec<Link>>> {
    let mut conn = state.db.acquire().await?;
    require_entry(&mut conn, entry_id, None).await?;
    Ok(Json(dal::entries::list_links(&mut conn, entry_id).await?))
}

pub async fn create_link(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
    Json(body): Json<LinkCreate>,
) -> AppResult<(StatusCode, Json<Link>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    let url = validation::validate_url(&body.url)?;
    let title = validation::optional_text(body.title.as_deref());

    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    let link = dal::entries::create_link(&mut tx, entry_id, title.as_deref(), &url).await?;
    events::record(&mut tx, Some(caller.actor()), "links", "create", link.id).await?;
    tx.commit().await?;

    tracing::info!(entry = entry_id, link = link.id, by = %caller.username(), "Link added");
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn update_link(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((entry_id, link_id)): Path<(i64, i64)>,
    Json(body): Json<LinkUpdate>,
) -> AppResult<Json<Link>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let url = match body.url.as_deref() {
        Some(url) => Some(validation::validate_url(url)?),
        None => None,
    };
    let title = validation::optional_text(body.title.as_deref());

    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    let link = dal::entries::update_link(&mut tx, entry_id, link_id, title.as_deref(), url.as_deref())
        .await?
        .ok_or_not_found("Link")?;
    events::record(&mut tx, Some(caller.actor()), "links", "update", link_id).await?;
    tx.commit().await?;
    Ok(Json(link))
}

pub async fn delete_link(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((entry_id, link_id)): Path<(i64, i64)>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    if !dal::entries::delete_link(&mut tx, entry_id, link_id).await? {
        return Err(AppError::NotFound("Link not found".to_string()));
    }
    events::record(&mut tx, Some(caller.actor()), "links", "delete", link_id).await?;
    tx.commit().await?;
    Ok(Json(Message::new("Link deleted")))
}

// Suggestions

pub async fn list_suggestions(
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<Vec<EntryMinimal>>> {
    let mut conn = state.db.acquire().await?;
    require_entry(&mut conn, entry_id, None).await?;
    Ok(Json(dal::entries::list_suggestions(&mut conn, entry_id).await?))
}

/// A suggestion points at a candidate translation, so it must cross languages.
pub async fn suggest(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
    Json(body): Json<SuggestionCreate>,
) -> AppResult<(StatusCode, Json<EntryPair>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    if body.child_id == entry_id {
        return Err(AppError::BadRequest("An entry cannot be suggested for itself".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let language = require_entry(&mut tx, entry_id, None).await?;
    let child_language = require_entry(&mut tx, body.child_id, None).await?;
    if language == child_language {
        return Err(AppError::BadRequest("Suggestions must point to an entry in the other language".to_string()));
    }
    dal::entries::add_suggestion(&mut tx, entry_id, body.child_id)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Suggestion already exists"))?;
    events::record(&mut tx, Some(caller.actor()), "suggestions", "create", entry_id).await?;
    let pair = dal::entries::get_pair(&mut tx, entry_id).await?.ok_or_else(entry_not_found)?;
    tx.commit().await?;

    tracing::info!(entry = entry_id, child = body.child_id, by = %caller.username(), "Suggestion added");
    Ok((StatusCode::CREATED, Json(pair)))
}

pub async fn remove_suggestion(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((entry_id, child_id)): Path<(i64, i64)>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    if !dal::entries::remove_suggestion(&mut tx, entry_id, child_id).await? {
        return Err(AppError::NotFound("Suggestion not found".to_string()));
    }
    events::record(&mut tx, Some(caller.actor()), "suggestions", "delete", entry_id).await?;
    tx.commit().await?;
    Ok(Json(Message::new("Suggestion deleted")))
}

// Translations

/// Replaces the entry's translation. The state may be named by id or by label.
pub async fn translate(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
    Json(body): Json<TranslationCreate>,
) -> AppResult<(StatusCode, Json<EntryPair>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    if body.translation_id == entry_id {
        return Err(AppError::BadRequest("An entry cannot be its own translation".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let language = require_entry(&mut tx, entry_id, None).await?;
    let other_language = require_entry(&mut tx, body.translation_id, None).await?;
    if other_language != language.other() {
        return Err(AppError::BadRequest("A translation must be in the other language".to_string()));
    }

    let state_id = match (body.state_id, body.state_label.as_deref()) {
        (Some(id), _) => Some(
            dal::translation_states::get_state(&mut tx, id).await?.ok_or_not_found("Translation state")?.id,
        ),
        (None, Some(label)) => Some(
            dal::translation_states::find_by_label(&mut tx, label.trim())
                .await?
                .ok_or_not_found("Translation state")?
                .id,
        ),
        (None, None) => None,
    };

    dal::entries::set_translation(&mut tx, entry_id, body.translation_id, state_id).await?;
    events::record(&mut tx, Some(caller.actor()), "translations", "create", entry_id).await?;
    let pair = dal::entries::get_pair(&mut tx, entry_id).await?.ok_or_else(entry_not_found)?;
    tx.commit().await?;

    tracing::info!(entry = entry_id, translation = body.translation_id, by = %caller.username(), "Translation set");
    Ok((StatusCode::CREATED, Json(pair)))
}

pub async fn remove_translation(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    if !dal::entries::remove_translation(&mut tx, entry_id).await? {
        return Err(AppError::NotFound("Translation not found".to_string()));
    }
    events::record(&mut tx, Some(caller.actor()), "translations", "delete", entry_id).await?;
    tx.commit().await?;
    Ok(Json(Message::new("Translation deleted")))
}

// Relations

/// Relations tie entries of the same language together, in both directions.
pub async fn relate(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(entry_id): Path<i64>,
    Json(body): Json<RelationCreate>,
) -> AppResult<(StatusCode, Json<EntryPair>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    if body.related_id == entry_id {
        return Err(AppError::BadRequest("An entry cannot be related to itself".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let language = require_entry(&mut tx, entry_id, None).await?;
    let related_language = require_entry(&mut tx, body.related_id, None).await?;
    if language != related_language {
        return Err(AppError::BadRequest("Related entries must share a language".to_string()));
    }
    if dal::entries::relation_exists(&mut tx, entry_id, body.related_id).await? {
        return Err(AppError::Conflict("Relation already exists".to_string()));
    }
    dal::entries::add_relation(&mut tx, entry_id, body.related_id).await?;
    events::record(&mut tx, Some(caller.actor()), "relations", "create", entry_id).await?;
    let pair = dal::entries::get_pair(&mut tx, entry_id).await?.ok_or_else(entry_not_found)?;
    tx.commit().await?;

    tracing::info!(entry = entry_id, related = body.related_id, by = %caller.username(), "Relation added");
    Ok((StatusCode::CREATED, Json(pair)))
}

pub async fn remove_relation(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((entry_id, related_id)): Path<(i64, i64)>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    if !dal::entries::remove_relation(&mut tx, entry_id, related_id).await? {
        return Err(AppError::NotFound("Relation not found".to_string()));
    }
    events::record(&mut tx, Some(caller.actor()), "relations", "delete", entry_id).await?;
    tx.commit().await?;
    Ok(Json(Message::new("Relation deleted")))
}

// Category membership

pub async fn add_to_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((entry_id, category_id)): Path<(i64, i64)>,
) -> AppResult<(StatusCode, Json<EntryPair>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    dal::categories::get_category(&mut tx, category_id).await?.ok_or_not_found("Category")?;
    dal::entries::add_to_category(&mut tx, entry_id, category_id)
        .await
        .map_err(|e| conflict_on_duplicate(e, "Entry is already in this category"))?;
    events::record(&mut tx, Some(caller.actor()), "category_to_entry", "create", entry_id).await?;
    let pair = dal::entries::get_pair(&mut tx, entry_id).await?.ok_or_else(entry_not_found)?;
    tx.commit().await?;
    Ok((StatusCode::CREATED, Json(pair)))
}

pub async fn remove_from_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path((entry_id, category_id)): Path<(i64, i64)>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    require_entry(&mut tx, entry_id, None).await?;
    if !dal::entries::remove_from_category(&mut tx, entry_id, category_id).await? {
        return Err(AppError::NotFound("Entry is not in this category".to_string()));
    }
    events::record(&mut tx, Some(caller.actor()), "category_to_entry", "delete", entry_id).await?;
    tx.commit().await?;
    Ok(Json(Message::new("Entry removed from category")))
}
