//! Prompt version models and DTOs.
//!
//! A prompt is a named parent owned by one user; its versions carry the
//! content and each version has zero or one tag row.

use promptkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A prompt version joined with its prompt name and current tag.
///
/// This is the shape every read and write endpoint returns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromptVersion {
    pub id: DbId,
    pub prompt_id: DbId,
    pub name: String,
    pub version: i32,
    pub content: String,
    pub tag: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Exact-match filters for version listings.
#[derive(Debug, Clone, Default)]
pub struct PromptVersionFilter {
    pub name: Option<String>,
    pub tag: Option<String>,
}

/// Request body for writing a new version of a (possibly new) prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePromptVersion {
    pub name: String,
    pub content: String,
    pub tag: Option<String>,
}

/// Request body for updating a version in place.
///
/// The outer `Option` records whether the field was present at all, so
/// `{"tag": null}` and `{"tag": ""}` clear the tag while an absent `tag`
/// leaves it alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePromptVersion {
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tag: Option<Option<String>>,
}

impl UpdatePromptVersion {
    pub fn content_is_set(&self) -> bool {
        self.content.is_some()
    }

    pub fn tag_is_set(&self) -> bool {
        self.tag.is_some()
    }
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
