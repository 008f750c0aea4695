use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    auth::{bearer_token, permissions, AuthError},
    dal::{self, events::Actor},
    error::{AppError, AppResult},
    state::AppState,
    types::UserDetail,
};

/// The authenticated caller, resolved from `Authorization: Bearer <jwt>`.
///
/// Rejects with 401 (and a `WWW-Authenticate: Bearer` challenge) when the header is
/// missing, the token does not verify, or its subject no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: UserDetail,
    pub permissions: i64,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Attribution for audit events.
    pub fn actor(&self) -> Actor<'_> {
        Actor { id: self.user.id, username: &self.user.username }
    }

    pub fn can(&self, required: i64) -> bool {
        permissions::has(self.permissions, required)
    }

    /// 403 unless every bit in `required` is granted.
    pub fn require(&self, required: i64) -> AppResult<()> {
        if self.can(required) {
            Ok(())
        } else {
            tracing::warn!(user = %self.user.username, required, "Permission denied");
            Err(AppError::Forbidden("You do not have permission to perform this action.".to_string()))
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::MissingToken)?;

        let claims = state.tokens.decode_access_token(token)?;

        let mut conn = state.db.acquire().await?;
        let user = dal::users::get_user_by_username(&mut conn, &claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UnknownSubject)?;
        let permissions = dal::users::effective_permissions(&mut conn, user.id).await?;

        Ok(CurrentUser { user, permissions })
    }
}

/// `Option<CurrentUser>`: anonymous when no `Authorization` header is sent, but a
/// header that fails to authenticate still rejects.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }
        <CurrentUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await.map(Some)
    }
}
