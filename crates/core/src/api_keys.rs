//! API key generation, hashing, prefix derivation and name validation.
//!
//! The raw key is only ever held in memory long enough to hand it back to the
//! caller once. Persistence sees the keyed hash and the display prefix.

use rand::Rng;

use crate::error::CoreError;
use crate::hashing::hmac_sha256_hex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Marker every issued key starts with, so leaked keys are recognizable.
pub const KEY_MARKER: &str = "pmk_";

/// Number of random alphanumeric characters after the marker (~256 bits).
pub const KEY_RANDOM_LENGTH: usize = 43;

/// Number of leading characters stored as a human-visible prefix.
pub const KEY_PREFIX_LENGTH: usize = 12;

/// Maximum number of non-revoked keys a single user may hold.
pub const MAX_ACTIVE_KEYS_PER_USER: i64 = 5;

/// Maximum length of a key's display name (after trimming).
pub const MAX_KEY_NAME_LENGTH: usize = 120;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// The result of generating a new API key.
pub struct GeneratedApiKey {
    /// The raw key (shown to the user exactly once, never stored).
    pub plaintext: String,
    /// The first [`KEY_PREFIX_LENGTH`] characters of the key for display.
    pub prefix: String,
    /// Keyed hash of the raw key (stored and used for lookup).
    pub hash: String,
}

/// Generate a fresh random API key string (`pmk_` + random alphanumerics).
pub fn issue_api_key() -> String {
    let random: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(KEY_RANDOM_LENGTH)
        .map(char::from)
        .collect();
    format!("{KEY_MARKER}{random}")
}

/// Generate a key and derive everything that gets persisted for it.
pub fn generate_api_key(hash_secret: &str) -> GeneratedApiKey {
    let plaintext = issue_api_key();
    let prefix = derive_prefix(&plaintext).to_string();
    let hash = hash_api_key(hash_secret, &plaintext);

    GeneratedApiKey {
        plaintext,
        prefix,
        hash,
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// Keyed one-way hash of a raw API key (hex HMAC-SHA256).
///
/// Used both at issuance and when authenticating an `X-API-Key` header.
pub fn hash_api_key(hash_secret: &str, raw: &str) -> String {
    hmac_sha256_hex(hash_secret.as_bytes(), raw.as_bytes())
}

/// Leading display prefix of a raw key. Never used for authentication.
pub fn derive_prefix(raw: &str) -> &str {
    match raw.char_indices().nth(KEY_PREFIX_LENGTH) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Trim a requested key name and check its length.
///
/// Returns the normalized name on success.
pub fn normalize_key_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("API key name cannot be blank".into()));
    }
    if trimmed.chars().count() > MAX_KEY_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "API key name must be at most {MAX_KEY_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}
