//! Credential-checking extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use promptkeep_core::types::DbId;
use promptkeep_db::models::user::User;

use crate::auth::access::{resolve_read_access, resolve_session, AccessContext};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user from a session token in the `Authorization` header.
///
/// Use this as an extractor parameter in any handler that writes:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The active user row the token resolved to.
    pub user: User,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_session(state, &parts.headers).await?;
        Ok(AuthUser {
            user_id: user.id,
            user,
        })
    }
}

/// Read-only principal from either a session token or an `X-API-Key` header.
#[derive(Debug, Clone)]
pub struct ReadAccess(pub AccessContext);

impl FromRequestParts<AppState> for ReadAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_read_access(state, &parts.headers).await.map(ReadAccess)
    }
}
