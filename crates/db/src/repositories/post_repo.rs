//! Repository for the `posts` table and the post feeds built on it.
//!
//! Feeds are always ordered newest-first with the id as tie-breaker so that
//! posts inserted in the same transaction still page deterministically.

use sqlx::PgPool;
use yatube_core::types::DbId;

use crate::models::post::{CreatePost, Post, PostFeed, PostView, UpdatePost};

/// Column list for plain `posts` rows.
const COLUMNS: &str = "id, text, pub_date, author_id, group_id, image";

/// Feed row projection over `posts p`, `users u`, `groups g`.
const VIEW_SELECT: &str = "\
    SELECT p.id, p.text, p.pub_date, p.image, p.author_id, \
           u.username AS author_username, \
           p.group_id, g.slug AS group_slug, g.title AS group_title \
    FROM posts p \
    JOIN users u ON u.id = p.author_id \
    LEFT JOIN groups g ON g.id = p.group_id";

const FEED_ORDER: &str = "ORDER BY p.pub_date DESC, p.id DESC";

/// Provides CRUD operations and feed queries for posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a new post, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (author_id, text, group_id, image)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(input.author_id)
            .bind(&input.text)
            .bind(input.group_id)
            .bind(&input.image)
            .fetch_one(pool)
            .await
    }

    /// Find a post by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a post with its author and group resolved.
    pub async fn find_view_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PostView>, sqlx::Error> {
        let query = format!("{VIEW_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, PostView>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply an edit in place. `pub_date` and `author_id` never change.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET
                text = $2,
                group_id = $3,
                image = COALESCE($4, image)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(&input.text)
            .bind(input.group_id)
            .bind(&input.image)
            .fetch_optional(pool)
            .await
    }

    /// Delete a post (its comments go with it).
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of posts in a feed.
    pub async fn count_feed(pool: &PgPool, feed: PostFeed) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM posts p {}", feed.where_clause());
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(key) = feed.key() {
            q = q.bind(key);
        }
        q.fetch_one(pool).await
    }

    /// One slice of a feed, newest first.
    pub async fn list_feed(
        pool: &PgPool,
        feed: PostFeed,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, sqlx::Error> {
        let key = feed.key();
        let first = if key.is_some() { 2 } else { 1 };
        let query = format!(
            "{VIEW_SELECT} {} {FEED_ORDER} LIMIT ${} OFFSET ${}",
            feed.where_clause(),
            first,
            first + 1
        );
        let mut q = sqlx::query_as::<_, PostView>(&query);
        if let Some(key) = key {
            q = q.bind(key);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Number of posts written by `author_id`.
    pub async fn count_by_author(pool: &PgPool, author_id: DbId) -> Result<i64, sqlx::Error> {
        Self::count_feed(pool, PostFeed::Author(author_id)).await
    }
}
