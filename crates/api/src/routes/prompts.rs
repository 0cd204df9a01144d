//! Route definitions for the `/prompts` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::prompts;
use crate::state::AppState;

/// Routes mounted at `/prompts`.
///
/// ```text
/// GET    /        -> list_prompts (session or X-API-Key)
/// POST   /        -> create_prompt (session)
/// PUT    /{id}    -> update_prompt (session)
/// DELETE /{id}    -> delete_prompt (session)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(prompts::list_prompts).post(prompts::create_prompt))
        .route(
            "/{id}",
            put(prompts::update_prompt).delete(prompts::delete_prompt),
        )
}
