use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    auth::permissions,
    dal::{self, categories::CategorySort, events},
    error::{validation, AppError, AppResult, OptionExt},
    extract::{Json, Path, Query},
    middleware::CurrentUser,
    pagination::PageQuery,
    state::AppState,
    types::{Category, CategoryCreate, CategoryList, CategoryUpdate, EntryList, Message},
};

#[derive(Debug, Default, Deserialize)]
pub struct CategorySortQuery {
    #[serde(default)]
    pub sort: Option<String>,
}

fn duplicate() -> AppError {
    AppError::Conflict("Category with this name and description already exists".to_string())
}

pub async fn create_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    caller.require(permissions::EDIT_LEXICON)?;
    let name = validation::required_text(&body.name, "name")?;
    let description = validation::optional_text(body.description.as_deref());

    let mut tx = state.db.begin().await?;
    if dal::categories::is_duplicate(&mut tx, &name, description.as_deref(), None).await? {
        return Err(duplicate());
    }
    let category = dal::categories::create_category(&mut tx, &name, description.as_deref()).await?;
    events::record(&mut tx, Some(caller.actor()), "categories", "create", category.id).await?;
    tx.commit().await?;

    tracing::info!(id = category.id, name = %category.name, by = %caller.username(), "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(sort): Query<CategorySortQuery>,
) -> AppResult<Json<CategoryList>> {
    let sort = CategorySort::parse(sort.sort.as_deref())
        .ok_or_else(|| AppError::BadRequest("sort must be one of name, id".to_string()))?;
    let mut conn = state.db.acquire().await?;
    let (categories, full_count) = dal::categories::list_categories(&mut conn, sort, state.page(&page)).await?;
    Ok(Json(CategoryList { categories, full_count }))
}

pub async fn get_category(State(state): State<AppState>, Path(category_id): Path<i64>) -> AppResult<Json<Category>> {
    let mut conn = state.db.acquire().await?;
    let category = dal::categories::get_category(&mut conn, category_id).await?.ok_or_not_found("Category")?;
    Ok(Json(category))
}

pub async fn category_entries(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<EntryList>> {
    let mut conn = state.db.acquire().await?;
    dal::categories::get_category(&mut conn, category_id).await?.ok_or_not_found("Category")?;
    let (entries, full_count) = dal::categories::list_entries(&mut conn, category_id, state.page(&page)).await?;
    Ok(Json(EntryList { entries, full_count }))
}

pub async fn update_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(category_id): Path<i64>,
    Json(body): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let name = match body.name.as_deref() {
        Some(name) => Some(validation::required_text(name, "name")?),
        None => None,
    };
    let description = validation::patch_text(body.description.as_deref());
    let description = description.as_ref().map(|d| d.as_deref());

    let mut tx = state.db.begin().await?;
    let current = dal::categories::get_category(&mut tx, category_id).await?.ok_or_not_found("Category")?;
    let final_name = name.as_deref().unwrap_or(&current.name);
    let final_description = description.unwrap_or(current.description.as_deref());
    if dal::categories::is_duplicate(&mut tx, final_name, final_description, Some(category_id)).await? {
        return Err(duplicate());
    }
    let category = dal::categories::update_category(&mut tx, category_id, name.as_deref(), description)
        .await?
        .ok_or_not_found("Category")?;
    events::record(&mut tx, Some(caller.actor()), "categories", "update", category_id).await?;
    tx.commit().await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(category_id): Path<i64>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::EDIT_LEXICON)?;
    let mut tx = state.db.begin().await?;
    if !dal::categories::delete_category(&mut tx, category_id).await? {
        return Err(AppError::NotFound("Category not found".to_string()));
    }
    events::record(&mut tx, Some(caller.actor()), "categories", "delete", category_id).await?;
    tx.commit().await?;
    tracing::info!(id = category_id, by = %caller.username(), "Category deleted");
    Ok(Json(Message::new("Category deleted")))
}
