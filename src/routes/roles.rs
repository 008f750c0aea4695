use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
};

use super::with_total_count;
use crate::{
    auth::permissions,
    dal,
    error::{validation, AppError, AppResult, OptionExt},
    extract::{Json, Path, Query},
    middleware::CurrentUser,
    pagination::PageQuery,
    state::AppState,
    types::{Message, Role, RoleCreate, RoleUpdate},
};

fn check_permission_bits(bits: i64) -> AppResult<()> {
    if bits & !permissions::ALL != 0 || bits < 0 {
        return Err(AppError::ValidationError {
            field: "permissions".to_string(),
            message: format!("Unknown permission bits; valid bits are within {}", permissions::ALL),
        });
    }
    Ok(())
}

pub async fn list_roles(State(state): State<AppState>, Query(q): Query<PageQuery>) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    let (roles, total) = dal::roles::list_roles(&mut conn, state.page(&q)).await?;
    Ok(with_total_count(roles, total))
}

pub async fn get_role(State(state): State<AppState>, Path(role_id): Path<i64>) -> AppResult<Json<Role>> {
    let mut conn = state.db.acquire().await?;
    let role = dal::roles::get_role(&mut conn, role_id).await?.ok_or_not_found("Role")?;
    Ok(Json(role))
}

pub async fn create_role(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(body): Json<RoleCreate>,
) -> AppResult<(StatusCode, Json<Role>)> {
    caller.require(permissions::MANAGE_ROLES)?;
    let name = validation::required_text(&body.name, "name")?;
    check_permission_bits(body.permissions)?;

    let mut conn = state.db.acquire().await?;
    let role = dal::roles::create_role(&mut conn, &name, body.permissions).await?;
    tracing::info!(role = %role.name, id = role.id, by = %caller.username(), "Role created");
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn update_role(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(role_id): Path<i64>,
    Json(body): Json<RoleUpdate>,
) -> AppResult<Json<Role>> {
    caller.require(permissions::MANAGE_ROLES)?;
    let name = match body.name.as_deref() {
        Some(name) => Some(validation::required_text(name, "name")?),
        None => None,
    };
    if let Some(bits) = body.permissions {
        check_permission_bits(bits)?;
    }

    let mut conn = state.db.acquire().await?;
    let role = dal::roles::update_role(&mut conn, role_id, name.as_deref(), body.permissions)
        .await?
        .ok_or_not_found("Role")?;
    tracing::info!(role = %role.name, id = role.id, by = %caller.username(), "Role updated");
    Ok(Json(role))
}

pub async fn delete_role(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(role_id): Path<i64>,
) -> AppResult<Json<Message>> {
    caller.require(permissions::MANAGE_ROLES)?;
    let mut conn = state.db.acquire().await?;
    if !dal::roles::delete_role(&mut conn, role_id).await? {
        return Err(AppError::NotFound("Role not found".to_string()));
    }
    tracing::info!(id = role_id, by = %caller.username(), "Role deleted");
    Ok(Json(Message::new("Role deleted")))
}
