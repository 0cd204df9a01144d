//! Handlers for per-user API keys (`/auth/api-keys`).
//!
//! Every route requires a session token: an API key cannot mint or revoke
//! other keys.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use promptkeep_core::api_keys::{generate_api_key, normalize_key_name};
use promptkeep_core::types::DbId;
use promptkeep_db::models::api_key::{ApiKeyCreatedResponse, CreateApiKey, UserApiKey};
use promptkeep_db::repositories::ApiKeyRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/auth/api-keys
///
/// All of the caller's keys, revoked ones included, newest first.
pub async fn list_api_keys(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<UserApiKey>>>> {
    let keys = ApiKeyRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: keys }))
}

/// POST /api/v1/auth/api-keys
///
/// Issue a key. The raw key appears in this response and nowhere else.
pub async fn create_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateApiKey>,
) -> AppResult<(StatusCode, Json<ApiKeyCreatedResponse>)> {
    let name = normalize_key_name(&input.name)?;
    let generated = generate_api_key(&state.config.api_key_secret);

    let key = ApiKeyRepo::create(
        &state.pool,
        auth.user_id,
        &name,
        &generated.hash,
        &generated.prefix,
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        api_key_id = key.id,
        prefix = %key.prefix,
        "API key created",
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyCreatedResponse {
            key,
            api_key: generated.plaintext,
        }),
    ))
}

/// DELETE /api/v1/auth/api-keys/{id}
///
/// Revoke a key. Revoking an already-revoked key also returns 204.
pub async fn revoke_api_key(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ApiKeyRepo::revoke(&state.pool, auth.user_id, id).await?;
    tracing::info!(user_id = auth.user_id, api_key_id = id, "API key revoked");
    Ok(StatusCode::NO_CONTENT)
}
