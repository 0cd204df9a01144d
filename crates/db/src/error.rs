//! Typed failures raised by the repository layer.

use promptkeep_core::api_keys::MAX_ACTIVE_KEYS_PER_USER;
use promptkeep_core::types::DbId;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Failure of a repository operation.
///
/// Every variant except [`StoreError::Database`] is an expected business
/// outcome. Any transaction in flight has already been rolled back by the
/// time one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The entity is absent or belongs to another owner.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("A user with this email already exists")]
    AlreadyExists,

    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("API key name cannot be blank")]
    NameInvalid,

    #[error("An API key with this name already exists")]
    NameConflict,

    #[error("API key limit reached (maximum {MAX_ACTIVE_KEYS_PER_USER} active keys)")]
    LimitReached,

    /// Concurrent writers raced on the next version number. Safe to retry.
    #[error("Concurrent write to prompt '{name}', retry the request")]
    VersionConflict { name: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Name of the violated constraint if `err` is a unique violation.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db_err.constraint().unwrap_or("unknown"))
        }
        _ => None,
    }
}
