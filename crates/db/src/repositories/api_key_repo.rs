//! Repository for the `user_api_keys` table.

use chrono::Utc;
use promptkeep_core::api_keys::MAX_ACTIVE_KEYS_PER_USER;
use promptkeep_core::types::DbId;
use sqlx::PgPool;

use crate::error::{unique_violation, StoreError};
use crate::models::api_key::UserApiKey;

const COLUMNS: &str = "\
    id, user_id, name, prefix, key_hash, created_at, last_used_at, revoked_at";

/// Constraint guarding "names are never recycled per user".
const NAME_CONSTRAINT: &str = "uq_user_api_keys_user_name";

/// Issues, lists, revokes and authenticates per-user API keys.
pub struct ApiKeyRepo;

impl ApiKeyRepo {
    /// List all keys (revoked included) for a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserApiKey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_api_keys \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, UserApiKey>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Store a newly issued key for `user_id`.
    ///
    /// The name is trimmed first. Checks, in order: blank name
    /// ([`StoreError::NameInvalid`]), name already used by any key of this
    /// user, revoked or not ([`StoreError::NameConflict`]), and the
    /// active-key quota ([`StoreError::LimitReached`]).
    ///
    /// The owner's user row is locked for the duration so concurrent
    /// issuance cannot exceed the quota. The name pre-check is only a fast
    /// path: a unique violation on insert or commit is the authoritative
    /// conflict signal and is reported as `NameConflict` too.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
        key_hash: &str,
        prefix: &str,
    ) -> Result<UserApiKey, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::NameInvalid);
        }

        let mut tx = pool.begin().await?;

        let owner: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owner.is_none() {
            return Err(StoreError::NotFound {
                entity: "User",
                id: user_id,
            });
        }

        let name_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM user_api_keys WHERE user_id = $1 AND name = $2)",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;
        if name_taken {
            return Err(StoreError::NameConflict);
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_api_keys WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if active >= MAX_ACTIVE_KEYS_PER_USER {
            return Err(StoreError::LimitReached);
        }

        let query = format!(
            "INSERT INTO user_api_keys (user_id, name, prefix, key_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let key = sqlx::query_as::<_, UserApiKey>(&query)
            .bind(user_id)
            .bind(name)
            .bind(prefix)
            .bind(key_hash)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(classify_insert_error)?;

        tx.commit().await.map_err(classify_insert_error)?;
        Ok(key)
    }

    /// Revoke a key owned by `user_id`.
    ///
    /// Idempotent: an already-revoked key keeps its original `revoked_at` and
    /// is returned unchanged. Fails with [`StoreError::NotFound`] when the key
    /// does not exist or belongs to someone else.
    pub async fn revoke(
        pool: &PgPool,
        user_id: DbId,
        key_id: DbId,
    ) -> Result<UserApiKey, StoreError> {
        let query = format!(
            "UPDATE user_api_keys SET revoked_at = COALESCE(revoked_at, $3) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserApiKey>(&query)
            .bind(key_id)
            .bind(user_id)
            .bind(Utc::now())
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "ApiKey",
                id: key_id,
            })
    }

    /// Find a non-revoked key by its hash. Used during authentication.
    pub async fn find_active_by_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<UserApiKey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_api_keys \
             WHERE key_hash = $1 AND revoked_at IS NULL"
        );
        sqlx::query_as::<_, UserApiKey>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    /// Set `last_used_at` to now.
    ///
    /// Fails with [`StoreError::NotFound`] if the key vanished since it was
    /// looked up. Any other failure is returned as-is.
    pub async fn touch_last_used(pool: &PgPool, key_id: DbId) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE user_api_keys SET last_used_at = $2 WHERE id = $1")
            .bind(key_id)
            .bind(Utc::now())
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "ApiKey",
                id: key_id,
            });
        }
        Ok(())
    }
}

fn classify_insert_error(err: sqlx::Error) -> StoreError {
    match unique_violation(&err) {
        Some(NAME_CONSTRAINT) => StoreError::NameConflict,
        _ => StoreError::Database(err),
    }
}
