//! Resolution of request credentials into an [`AccessContext`].
//!
//! Two credential kinds exist: a session token in `Authorization: Bearer`
//! and an API key in `X-API-Key`. Writes accept only the former; reads
//! accept either. A bearer credential that is present but invalid is a hard
//! failure, never a reason to try the API key instead.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use promptkeep_core::api_keys::hash_api_key;
use promptkeep_core::types::DbId;
use promptkeep_db::models::user::User;
use promptkeep_db::repositories::{ApiKeyRepo, UserRepo};
use promptkeep_db::StoreError;
use serde::Serialize;

use crate::auth::jwt::decode_subject;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying a raw API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Which credential produced an [`AccessContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    Session,
    ApiKey,
}

impl AccessSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessSource::Session => "session",
            AccessSource::ApiKey => "api_key",
        }
    }
}

/// The authenticated principal behind a request.
///
/// API-key access never carries a full user record, only the owner id.
#[derive(Debug, Clone)]
pub enum AccessContext {
    Session { user: User },
    ApiKey { key_id: DbId, owner_id: DbId },
}

impl AccessContext {
    /// Id of the account whose data this request may see.
    pub fn owner_id(&self) -> DbId {
        match self {
            AccessContext::Session { user } => user.id,
            AccessContext::ApiKey { owner_id, .. } => *owner_id,
        }
    }

    pub fn source(&self) -> AccessSource {
        match self {
            AccessContext::Session { .. } => AccessSource::Session,
            AccessContext::ApiKey { .. } => AccessSource::ApiKey,
        }
    }
}

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

/// The token of an `Authorization: Bearer <token>` header, if one was sent.
///
/// The scheme is matched case-insensitively. Any other scheme counts as no
/// bearer credential at all. An empty token is still returned so that it
/// fails validation instead of being ignored.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

/// The raw `X-API-Key` value, if a non-blank one was sent.
pub fn api_key_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a session-token-only principal. Used by every write endpoint.
pub async fn resolve_session(state: &AppState, headers: &HeaderMap) -> AppResult<User> {
    let token = bearer_token(headers).ok_or_else(|| AppError::unauthorized("Not authenticated"))?;
    authenticate_token(state, token).await
}

/// Resolve a read principal from a session token or, failing that, an API key.
pub async fn resolve_read_access(
    state: &AppState,
    headers: &HeaderMap,
) -> AppResult<AccessContext> {
    if let Some(token) = bearer_token(headers) {
        let user = authenticate_token(state, token).await?;
        return Ok(AccessContext::Session { user });
    }

    if let Some(raw_key) = api_key_header(headers) {
        return authenticate_api_key(state, raw_key).await;
    }

    Err(AppError::unauthorized("Not authenticated"))
}

/// Decode a session token and load its active user.
pub async fn authenticate_token(state: &AppState, token: &str) -> AppResult<User> {
    let user_id = decode_subject(token, &state.config.jwt).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::unauthorized("Could not validate credentials")
    })?;

    match UserRepo::find_by_id(&state.pool, user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => {
            tracing::warn!(user_id, "Session token for missing or inactive user");
            Err(AppError::unauthorized("Could not validate credentials"))
        }
    }
}

/// Look up an active API key by hash and record its use.
///
/// Only a key that vanished between lookup and touch rejects the request.
/// Any other failure to record `last_used_at` is logged and tolerated.
pub async fn authenticate_api_key(state: &AppState, raw_key: &str) -> AppResult<AccessContext> {
    let key_hash = hash_api_key(&state.config.api_key_secret, raw_key);
    let Some(key) = ApiKeyRepo::find_active_by_hash(&state.pool, &key_hash).await? else {
        tracing::warn!("Rejected unknown or revoked API key");
        return Err(AppError::unauthorized("Not authenticated"));
    };

    match ApiKeyRepo::touch_last_used(&state.pool, key.id).await {
        Ok(()) => {}
        Err(StoreError::NotFound { .. }) => {
            return Err(AppError::unauthorized("Not authenticated"));
        }
        Err(err) => {
            tracing::warn!(error = %err, api_key_id = key.id, "Failed to record API key use");
        }
    }

    Ok(AccessContext::ApiKey {
        key_id: key.id,
        owner_id: key.user_id,
    })
}
