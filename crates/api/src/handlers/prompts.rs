//! Handlers for the `/prompts` resource.
//!
//! Listing accepts a session token or an API key; every write requires a
//! session token. All access is scoped to the caller's own prompts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use promptkeep_core::prompts::{
    resolve_list_limit, validate_content, validate_filter, validate_prompt_name, validate_tag,
    MAX_PROMPT_NAME_LENGTH, MAX_TAG_LENGTH,
};
use promptkeep_core::types::DbId;
use promptkeep_db::models::prompt::{
    CreatePromptVersion, PromptVersion, PromptVersionFilter, UpdatePromptVersion,
};
use promptkeep_db::repositories::PromptRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, ReadAccess};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /prompts`.
#[derive(Debug, Default, Deserialize)]
pub struct ListPromptsParams {
    pub name: Option<String>,
    pub tag: Option<String>,
    /// Return only the newest matching version.
    #[serde(default)]
    pub latest: bool,
    pub limit: Option<i64>,
}

/// GET /api/v1/prompts
pub async fn list_prompts(
    State(state): State<AppState>,
    ReadAccess(access): ReadAccess,
    Query(params): Query<ListPromptsParams>,
) -> AppResult<Json<DataResponse<Vec<PromptVersion>>>> {
    validate_filter("name", params.name.as_deref(), MAX_PROMPT_NAME_LENGTH)?;
    validate_filter("tag", params.tag.as_deref(), MAX_TAG_LENGTH)?;
    let limit = resolve_list_limit(params.latest, params.limit)?;

    let filter = PromptVersionFilter {
        name: params.name,
        tag: params.tag,
    };
    let versions =
        PromptRepo::list_versions(&state.pool, &filter, access.owner_id(), limit).await?;

    tracing::debug!(
        owner_id = access.owner_id(),
        source = access.source().as_str(),
        count = versions.len(),
        "Listed prompt versions",
    );
    Ok(Json(DataResponse { data: versions }))
}

/// POST /api/v1/prompts
///
/// Write a new version of the named prompt, creating the prompt on first
/// write. Returns 201 with the stored version.
pub async fn create_prompt(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreatePromptVersion>,
) -> AppResult<(StatusCode, Json<PromptVersion>)> {
    validate_prompt_name(&input.name)?;
    validate_content(&input.content)?;
    if let Some(tag) = &input.tag {
        validate_tag(tag)?;
    }

    let version = PromptRepo::create_version(&state.pool, auth.user_id, &input).await?;
    tracing::info!(
        user_id = auth.user_id,
        prompt_id = version.prompt_id,
        prompt_version_id = version.id,
        version = version.version,
        "Prompt version created",
    );

    Ok((StatusCode::CREATED, Json(version)))
}

/// PUT /api/v1/prompts/{id}
///
/// Replace a version's content and/or tag. A blank or null `tag` clears it.
pub async fn update_prompt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePromptVersion>,
) -> AppResult<Json<PromptVersion>> {
    validate_update(&input)?;

    let version = PromptRepo::update_version(&state.pool, auth.user_id, id, &input).await?;
    tracing::info!(
        user_id = auth.user_id,
        prompt_version_id = id,
        content_changed = input.content_is_set(),
        tag_changed = input.tag_is_set(),
        "Prompt version updated",
    );

    Ok(Json(version))
}

/// DELETE /api/v1/prompts/{id}
///
/// Delete a version. The prompt goes with its last version.
pub async fn delete_prompt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let prompt_removed = PromptRepo::delete_version(&state.pool, auth.user_id, id).await?;
    tracing::info!(
        user_id = auth.user_id,
        prompt_version_id = id,
        prompt_removed,
        "Prompt version deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}

/// An update must set at least one field, and `content` cannot be null.
fn validate_update(input: &UpdatePromptVersion) -> AppResult<()> {
    if !input.content_is_set() && !input.tag_is_set() {
        return Err(AppError::BadRequest(
            "At least one field (content or tag) must be provided".into(),
        ));
    }
    match &input.content {
        Some(None) => {
            return Err(AppError::BadRequest(
                "content cannot be null when provided".into(),
            ))
        }
        Some(Some(content)) => validate_content(content)?,
        None => {}
    }
    if let Some(Some(tag)) = &input.tag {
        validate_tag(tag)?;
    }
    Ok(())
}
