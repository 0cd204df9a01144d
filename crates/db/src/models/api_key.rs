//! Per-user API key models and DTOs.

use promptkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_api_keys` table.
///
/// `key_hash` is never serialized. `prefix` identifies the key to humans.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserApiKey {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub user_id: DbId,
    pub name: String,
    pub prefix: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

impl UserApiKey {
    /// A key is active until it has been revoked.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// Request body for issuing a key.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKey {
    pub name: String,
}

/// Response returned when a new API key is created.
/// Includes the raw key (shown exactly once).
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyCreatedResponse {
    #[serde(flatten)]
    pub key: UserApiKey,
    /// The full raw key. Shown **once** and never stored.
    pub api_key: String,
}
