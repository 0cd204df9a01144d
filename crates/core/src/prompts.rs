//! Prompt name, content and tag rules, plus list-limit resolution.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a prompt name.
pub const MAX_PROMPT_NAME_LENGTH: usize = 255;

/// Maximum length of a (trimmed) tag.
pub const MAX_TAG_LENGTH: usize = 64;

/// Upper bound for the `limit` parameter on version listings.
pub const MAX_LIST_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Tag normalization
// ---------------------------------------------------------------------------

/// Trim a tag and collapse blank input to "no tag".
///
/// Tags are case-sensitive; only surrounding whitespace is removed.
pub fn normalize_tag(tag: Option<&str>) -> Option<String> {
    tag.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a prompt name (non-empty, at most 255 characters).
pub fn validate_prompt_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation("Prompt name must not be empty".into()));
    }
    if name.chars().count() > MAX_PROMPT_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Prompt name must be at most {MAX_PROMPT_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate prompt content (non-empty).
pub fn validate_content(content: &str) -> Result<(), CoreError> {
    if content.is_empty() {
        return Err(CoreError::Validation(
            "Prompt content must not be empty".into(),
        ));
    }
    Ok(())
}

/// Validate a tag supplied on a write. Blank tags are allowed and mean "none".
pub fn validate_tag(tag: &str) -> Result<(), CoreError> {
    if tag.trim().chars().count() > MAX_TAG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Tag must be at most {MAX_TAG_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional exact-match filter value used on listings.
pub fn validate_filter(field: &str, value: Option<&str>, max: usize) -> Result<(), CoreError> {
    if let Some(value) = value {
        if value.is_empty() {
            return Err(CoreError::Validation(format!(
                "{field} filter must not be empty"
            )));
        }
        if value.chars().count() > max {
            return Err(CoreError::Validation(format!(
                "{field} filter must be at most {max} characters"
            )));
        }
    }
    Ok(())
}

/// Resolve the effective row limit for a listing.
///
/// `latest` collapses to a single row and wins over an explicit `limit`.
/// An explicit `limit` must lie in `1..=100`.
pub fn resolve_list_limit(latest: bool, limit: Option<i64>) -> Result<Option<i64>, CoreError> {
    if let Some(limit) = limit {
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}"
            )));
        }
    }
    if latest {
        return Ok(Some(1));
    }
    Ok(limit)
}
