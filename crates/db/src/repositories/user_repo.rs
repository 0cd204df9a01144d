//! Repository for the `users` table.

use chrono::Utc;
use promptkeep_core::types::DbId;
use sqlx::PgPool;

use crate::error::{unique_violation, StoreError};
use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, is_active, created_at";

/// Provides account lookup, creation and credential checks.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new active user, returning the created row.
    ///
    /// The email is lowercased before storage. Fails with
    /// [`StoreError::AlreadyExists`] when the address is taken, including when
    /// a concurrent registration wins the race on `uq_users_email`.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let email = email.to_lowercase();
        if Self::find_by_email(pool, &email).await?.is_some() {
            return Err(StoreError::AlreadyExists);
        }

        let query = format!(
            "INSERT INTO users (email, password_hash, is_active, created_at)
             VALUES ($1, $2, true, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&email)
            .bind(password_hash)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
            .map_err(|err| match unique_violation(&err) {
                Some("uq_users_email") => StoreError::AlreadyExists,
                _ => StoreError::Database(err),
            })
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive; the input is lowercased).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// Check an email + password pair.
    ///
    /// `verify` is the one-way password check (`verify(plain, hash)`).
    /// Unknown email, wrong password and deactivated account all fail with
    /// the same [`StoreError::InvalidCredentials`].
    pub async fn authenticate<F>(
        pool: &PgPool,
        email: &str,
        password: &str,
        verify: F,
    ) -> Result<User, StoreError>
    where
        F: Fn(&str, &str) -> bool,
    {
        let Some(user) = Self::find_by_email(pool, email).await? else {
            return Err(StoreError::InvalidCredentials);
        };

        if !verify(password, &user.password_hash) || !user.is_active {
            return Err(StoreError::InvalidCredentials);
        }

        Ok(user)
    }
}
