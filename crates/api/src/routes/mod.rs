pub mod auth;
pub mod health;
pub mod prompts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/me                       current user (session)
/// /auth/api-keys                 list, create (session)
/// /auth/api-keys/{id}            revoke (session)
///
/// /prompts                       list (session or API key), create (session)
/// /prompts/{id}                  update, delete (session)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/prompts", prompts::router())
}
