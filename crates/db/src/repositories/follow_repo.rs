//! Repository for the `follows` table.
//!
//! The `(user_id, author_id)` pair is unique (`uq_follows_user_author`).
//! Nothing here prevents `user_id == author_id`; callers that care must check.

use sqlx::PgPool;
use yatube_core::types::DbId;

use crate::models::follow::Follow;

const COLUMNS: &str = "id, user_id, author_id, created_at";

/// Provides data access for follow edges.
pub struct FollowRepo;

impl FollowRepo {
    /// Insert an edge, failing with a unique violation if it already exists.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        author_id: DbId,
    ) -> Result<Follow, sqlx::Error> {
        let query = format!(
            "INSERT INTO follows (user_id, author_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Follow>(&query)
            .bind(user_id)
            .bind(author_id)
            .fetch_one(pool)
            .await
    }

    /// Return the edge, creating it if missing.
    ///
    /// The boolean is `true` when this call inserted the row.
    pub async fn get_or_create(
        pool: &PgPool,
        user_id: DbId,
        author_id: DbId,
    ) -> Result<(Follow, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO follows (user_id, author_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_follows_user_author DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Follow>(&insert)
            .bind(user_id)
            .bind(author_id)
            .fetch_optional(pool)
            .await?;
        if let Some(follow) = inserted {
            return Ok((follow, true));
        }

        let select = format!("SELECT {COLUMNS} FROM follows WHERE user_id = $1 AND author_id = $2");
        let existing = sqlx::query_as::<_, Follow>(&select)
            .bind(user_id)
            .bind(author_id)
            .fetch_one(pool)
            .await?;
        Ok((existing, false))
    }

    /// Remove the edge. Returns `true` if one existed.
    pub async fn delete(pool: &PgPool, user_id: DbId, author_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(pool: &PgPool, user_id: DbId, author_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// Number of edges between the pair (0 or 1 given the constraint).
    pub async fn count_pair(pool: &PgPool, user_id: DbId, author_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM follows WHERE user_id = $1 AND author_id = $2",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// Authors followed by `user_id`, as a list of ids.
    pub async fn list_author_ids(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT author_id FROM follows WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
