//! Repository for the `prompts`, `prompt_versions` and `prompt_tags` tables.

use chrono::Utc;
use promptkeep_core::prompts::normalize_tag;
use promptkeep_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::error::{unique_violation, StoreError};
use crate::models::prompt::{
    CreatePromptVersion, PromptVersion, PromptVersionFilter, UpdatePromptVersion,
};

/// Joined projection of a version with its prompt name and current tag.
///
/// Callers append `WHERE`/`ORDER BY` clauses. The lateral join yields at most
/// one tag so a stray duplicate row can never fan out a listing.
const DETAIL_SELECT: &str = "\
    SELECT pv.id, pv.prompt_id, p.name, pv.version, pv.content, \
           pt.name AS tag, pv.created_at, pv.updated_at \
    FROM prompt_versions pv \
    JOIN prompts p ON p.id = pv.prompt_id \
    LEFT JOIN LATERAL ( \
        SELECT t.name FROM prompt_tags t \
        WHERE t.prompt_version_id = pv.id \
        ORDER BY t.id DESC LIMIT 1 \
    ) pt ON true";

/// Constraints whose violation during `create_version` means another writer
/// got there first.
const VERSION_RACE_CONSTRAINTS: [&str; 2] =
    ["uq_prompt_versions_prompt_version", "uq_prompts_owner_name"];

const CREATE_VERSION_ATTEMPTS: u32 = 3;

/// Versioned, owner-scoped prompt storage.
pub struct PromptRepo;

impl PromptRepo {
    /// List versions visible to `owner_id`, by prompt name ascending and then
    /// newest version first.
    ///
    /// `name` and `tag` are exact-match filters; `tag` matches only the tag
    /// currently attached. `limit` of `None` returns everything.
    pub async fn list_versions(
        pool: &PgPool,
        filter: &PromptVersionFilter,
        owner_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<PromptVersion>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} \
             WHERE p.owner_id = $1 \
               AND ($2::TEXT IS NULL OR p.name = $2) \
               AND ($3::TEXT IS NULL OR pt.name = $3) \
             ORDER BY p.name ASC, pv.version DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, PromptVersion>(&query)
            .bind(owner_id)
            .bind(filter.name.as_deref())
            .bind(filter.tag.as_deref())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Append a new version to the `(owner_id, input.name)` prompt, creating
    /// the prompt if this is its first version.
    ///
    /// The version number is `max(existing) + 1`. Prompt upsert, version
    /// insert and tag insert commit together or not at all. A lost race on
    /// either uniqueness constraint, or a parent prompt deleted underneath
    /// the write, is retried a few times before surfacing as
    /// [`StoreError::VersionConflict`].
    pub async fn create_version(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreatePromptVersion,
    ) -> Result<PromptVersion, StoreError> {
        for attempt in 1..=CREATE_VERSION_ATTEMPTS {
            match Self::try_create_version(pool, owner_id, input).await {
                Ok(Some(created)) => return Ok(created),
                Ok(None) => {}
                Err(StoreError::Database(err)) if is_version_race(&err) => {}
                Err(err) => return Err(err),
            }
            tracing::warn!(
                owner_id,
                prompt_name = %input.name,
                attempt,
                "Concurrent prompt version write, retrying",
            );
        }

        Err(StoreError::VersionConflict {
            name: input.name.clone(),
        })
    }

    /// One transactional attempt. `Ok(None)` means the parent prompt was
    /// deleted between the upsert and the lock; the transaction rolls back.
    async fn try_create_version(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreatePromptVersion,
    ) -> Result<Option<PromptVersion>, StoreError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO prompts (owner_id, name, created_at) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_prompts_owner_name DO NOTHING",
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Locking the parent serializes writers computing the next version.
        let prompt_id: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM prompts WHERE owner_id = $1 AND name = $2 FOR UPDATE",
        )
        .bind(owner_id)
        .bind(&input.name)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(prompt_id) = prompt_id else {
            return Ok(None);
        };

        let next_version: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM prompt_versions WHERE prompt_id = $1",
        )
        .bind(prompt_id)
        .fetch_one(&mut *tx)
        .await?;

        let version_id: DbId = sqlx::query_scalar(
            "INSERT INTO prompt_versions (prompt_id, version, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING id",
        )
        .bind(prompt_id)
        .bind(next_version)
        .bind(&input.content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let tag = normalize_tag(input.tag.as_deref());
        replace_tag(&mut tx, version_id, tag.as_deref()).await?;

        let created = Self::fetch_detail(&mut *tx, owner_id, version_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "PromptVersion",
                id: version_id,
            })?;

        tx.commit().await?;
        Ok(Some(created))
    }

    /// Update a version in place.
    ///
    /// Content is replaced when `patch.content` carries a value. When
    /// `patch.tag` is present the version's tag is replaced: a blank or null
    /// tag clears it. `updated_at` advances on every call. The returned
    /// version's `tag` is the tag in effect after the write.
    pub async fn update_version(
        pool: &PgPool,
        owner_id: DbId,
        version_id: DbId,
        patch: &UpdatePromptVersion,
    ) -> Result<PromptVersion, StoreError> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> = sqlx::query_scalar(
            "SELECT pv.id FROM prompt_versions pv \
             JOIN prompts p ON p.id = pv.prompt_id \
             WHERE pv.id = $1 AND p.owner_id = $2 \
             FOR UPDATE OF pv",
        )
        .bind(version_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound {
                entity: "PromptVersion",
                id: version_id,
            });
        }

        let content = patch.content.as_ref().and_then(|c| c.as_deref());
        sqlx::query(
            "UPDATE prompt_versions SET content = COALESCE($2, content), updated_at = $3 \
             WHERE id = $1",
        )
        .bind(version_id)
        .bind(content)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if let Some(tag) = &patch.tag {
            let tag = normalize_tag(tag.as_deref());
            replace_tag(&mut tx, version_id, tag.as_deref()).await?;
        }

        let updated = Self::fetch_detail(&mut *tx, owner_id, version_id)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "PromptVersion",
                id: version_id,
            })?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a version and its tag. Removes the parent prompt too when this
    /// was its last version.
    ///
    /// Returns `true` if the prompt was removed along with the version.
    pub async fn delete_version(
        pool: &PgPool,
        owner_id: DbId,
        version_id: DbId,
    ) -> Result<bool, StoreError> {
        let not_found = || StoreError::NotFound {
            entity: "PromptVersion",
            id: version_id,
        };
        let mut tx = pool.begin().await?;

        let prompt_id: DbId = sqlx::query_scalar(
            "SELECT pv.prompt_id FROM prompt_versions pv \
             JOIN prompts p ON p.id = pv.prompt_id \
             WHERE pv.id = $1 AND p.owner_id = $2",
        )
        .bind(version_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;

        // Held until commit so a concurrent delete sees the final count.
        sqlx::query("SELECT id FROM prompts WHERE id = $1 FOR UPDATE")
            .bind(prompt_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM prompt_tags WHERE prompt_version_id = $1")
            .bind(version_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM prompt_versions WHERE id = $1")
            .bind(version_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(not_found());
        }

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM prompt_versions WHERE prompt_id = $1")
                .bind(prompt_id)
                .fetch_one(&mut *tx)
                .await?;

        let prompt_removed = remaining == 0;
        if prompt_removed {
            sqlx::query("DELETE FROM prompts WHERE id = $1")
                .bind(prompt_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(prompt_removed)
    }

    async fn fetch_detail<'e, E>(
        executor: E,
        owner_id: DbId,
        version_id: DbId,
    ) -> Result<Option<PromptVersion>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("{DETAIL_SELECT} WHERE pv.id = $1 AND p.owner_id = $2");
        sqlx::query_as::<_, PromptVersion>(&query)
            .bind(version_id)
            .bind(owner_id)
            .fetch_optional(executor)
            .await
    }
}

/// Make `tag` the version's only tag, or leave it untagged when `None`.
async fn replace_tag(
    conn: &mut PgConnection,
    version_id: DbId,
    tag: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM prompt_tags WHERE prompt_version_id = $1")
        .bind(version_id)
        .execute(&mut *conn)
        .await?;

    if let Some(tag) = tag {
        sqlx::query("INSERT INTO prompt_tags (prompt_version_id, name) VALUES ($1, $2)")
            .bind(version_id)
            .bind(tag)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn is_version_race(err: &sqlx::Error) -> bool {
    unique_violation(err).is_some_and(|c| VERSION_RACE_CONSTRAINTS.contains(&c))
}
