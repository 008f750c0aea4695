use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};

use super::with_total_count;
use crate::{
    auth::{self, permissions},
    dal,
    error::{validation, AppError, AppResult, OptionExt},
    extract::{Form, Json, Path, Query},
    middleware::{ip::MaybeRemoteAddr, CurrentUser},
    pagination::{Page, PageQuery},
    state::{AppState, LOGIN_ENDPOINT},
    types::{LoginForm, Message, PermissionSet, Role, Token, UserCreate, UserDetail, UserUpdate},
};

pub async fn list_users(State(state): State<AppState>, Query(q): Query<PageQuery>) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    let (users, total) = dal::users::list_users(&mut conn, state.page(&q)).await?;
    Ok(with_total_count(users, total))
}

/// Open registration. Assigning roles at creation needs `MANAGE_USERS`.
pub async fn create_user(
    State(state): State<AppState>,
    caller: Option<CurrentUser>,
    Json(body): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<UserDetail>)> {
    let username = validation::required_text(&body.username, "username")?;
    validation::validate_password(&body.password)?;
    let display_name = validation::optional_text(body.display_name.as_deref());
    if !body.roles.is_empty() {
        match &caller {
            Some(caller) => caller.require(permissions::MANAGE_USERS)?,
            None => return Err(AppError::Unauthorized("Could not validate credentials".to_string())),
        }
    }

    let hashed = auth::hash_password(body.password, state.config.passwords.bcrypt_cost).await?;

    let mut tx = state.db.begin().await?;
    let user = match dal::users::create_user(&mut tx, &username, display_name.as_deref(), &hashed, &body.roles).await
    {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    tracing::info!(user = %user.username, id = user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Form-encoded password login; rate limited per client IP.
pub async fn login(
    State(state): State<AppState>,
    remote: MaybeRemoteAddr,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<Token>> {
    let ip = remote.client_ip(&headers);
    state.rate_limiter.check_endpoint_limit(LOGIN_ENDPOINT, ip).await?;

    let mut conn = state.db.acquire().await?;
    let Some(user) = auth::authenticate_user(&mut conn, &form.username, &form.password).await? else {
        state.metrics.inc_logins_failed();
        tracing::warn!(username = %form.username, %ip, "Failed login attempt");
        return Err(AppError::Unauthorized("Incorrect username or password".to_string()));
    };
    dal::users::touch_last_active(&mut conn, user.id).await?;

    let access_token = state.tokens.issue(&user.username)?;
    state.metrics.inc_logins_succeeded();
    tracing::info!(user = %user.username, "User logged in");
    Ok(Json(Token { access_token, token_type: "bearer".to_string() }))
}

pub async fn me(user: CurrentUser) -> Json<UserDetail> {
    Json(user.user)
}

pub async fn my_permissions(user: CurrentUser) -> Json<PermissionSet> {
    Json(PermissionSet { permissions: user.permissions })
}

pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> AppResult<Json<UserDetail>> {
    let mut conn = state.db.acquire().await?;
    let user = dal::users::get_user(&mut conn, user_id).await?.ok_or_not_found("User")?;
    Ok(Json(user))
}

/// Only the account owner may edit it.
pub async fn update_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(user_id): Path<i64>,
    Json(body): Json<UserUpdate>,
) -> AppResult<Json<UserDetail>> {
    if caller.id() != user_id {
        return Err(AppError::Unauthorized("You are not the owner of this account.".to_string()));
    }
    let display_name = validation::patch_text(body.display_name.as_deref());
    let hashed = match body.password {
        Some(password) => {
            validation::validate_password(&password)?;
            Some(auth::hash_password(password, state.config.passwords.bcrypt_cost).await?)
        }
        None => None,
    };

    let mut conn = state.db.acquire().await?;
    if !dal::users::update_user(&mut conn, user_id, display_name.as_ref().map(|d| d.as_deref()), hashed.as_deref()).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let user = dal::users::get_user(&mut conn, user_id).await?.ok_or_not_found("User")?;
    tracing::info!(user = %user.username, "User updated");
    Ok(Json(user))
}

/// Owners may delete themselves; anyone else needs `MANAGE_USERS`.
pub async fn delete_user(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Message>> {
    if caller.id() != user_id {
        caller.require(permissions::MANAGE_USERS)?;
    }
    let mut conn = state.db.acquire().await?;
    if !dal::users::delete_user(&mut conn, user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!(id = user_id, by = %caller.username(), "User deleted");
    Ok(Json(Message::new("User deleted")))
}

pub async fn user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(q): Query<PageQuery>,
) -> AppResult<Response> {
    let mut conn = state.db.acquire().await?;
    if !dal::users::user_exists(&mut conn, user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let (roles, total) = dal::users::user_roles(&mut conn, user_id, state.page(&q)).await?;
    Ok(with_total_count(roles, total))
}

/// Appends roles; unknown ids and existing memberships are skipped.
pub async fn add_user_roles(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(user_id): Path<i64>,
    Json(role_ids): Json<Vec<i64>>,
) -> AppResult<Json<Vec<Role>>> {
    caller.require(permissions::MANAGE_USERS)?;
    let mut tx = state.db.begin().await?;
    if !dal::users::user_exists(&mut tx, user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let added = dal::users::add_roles(&mut tx, user_id, &role_ids).await?;
    let roles = all_roles_of(&mut tx, &state, user_id).await?;
    tx.commit().await?;
    tracing::info!(id = user_id, added, by = %caller.username(), "Roles granted");
    Ok(Json(roles))
}

pub async fn remove_user_roles(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(user_id): Path<i64>,
    Json(role_ids): Json<Vec<i64>>,
) -> AppResult<Json<Vec<Role>>> {
    caller.require(permissions::MANAGE_USERS)?;
    let mut tx = state.db.begin().await?;
    if !dal::users::user_exists(&mut tx, user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let removed = dal::users::remove_roles(&mut tx, user_id, &role_ids).await?;
    let roles = all_roles_of(&mut tx, &state, user_id).await?;
    tx.commit().await?;
    tracing::info!(id = user_id, removed, by = %caller.username(), "Roles revoked");
    Ok(Json(roles))
}

async fn all_roles_of(conn: &mut sqlx::SqliteConnection, state: &AppState, user_id: i64) -> AppResult<Vec<Role>> {
    let page = Page { skip: 0, limit: state.config.pagination.max_limit };
    let (roles, _) = dal::users::user_roles(conn, user_id, page).await?;
    Ok(roles)
}
