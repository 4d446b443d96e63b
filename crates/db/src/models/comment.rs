//! Comment models and DTOs.

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use yatube_core::text::{truncate_chars, COMMENT_SYMBOLS};
use yatube_core::types::{DbId, Timestamp};

/// A row from the `comments` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub created: Timestamp,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(truncate_chars(&self.text, COMMENT_SYMBOLS))
    }
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentView {
    pub id: DbId,
    pub post_id: DbId,
    pub author_id: DbId,
    pub author_username: String,
    pub text: String,
    pub created: Timestamp,
}

/// DTO for inserting a comment.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub post_id: DbId,
    pub author_id: DbId,
    pub text: String,
}
