//! Post models, feed rows and DTOs.

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use yatube_core::text::{truncate_chars, POST_SYMBOLS};
use yatube_core::types::{DbId, Timestamp};

/// A row from the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub text: String,
    pub pub_date: Timestamp,
    pub author_id: DbId,
    pub group_id: Option<DbId>,
    /// Path relative to the media root, e.g. `posts/3f2c….png`.
    pub image: Option<String>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(truncate_chars(&self.text, POST_SYMBOLS))
    }
}

/// A post joined with its author's username and group, as shown in feeds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostView {
    pub id: DbId,
    pub text: String,
    pub pub_date: Timestamp,
    pub image: Option<String>,
    pub author_id: DbId,
    pub author_username: String,
    pub group_id: Option<DbId>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

/// DTO for inserting a post.
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub author_id: DbId,
    pub text: String,
    pub group_id: Option<DbId>,
    pub image: Option<String>,
}

/// DTO for editing a post in place.
///
/// `text` and `group_id` are always written (a `None` group clears it);
/// `image` is only replaced when a new one is given.
#[derive(Debug, Clone)]
pub struct UpdatePost {
    pub text: String,
    pub group_id: Option<DbId>,
    pub image: Option<String>,
}

/// Which slice of posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFeed {
    /// Every post.
    All,
    /// Posts filed under one group.
    Group(DbId),
    /// Posts written by one author.
    Author(DbId),
    /// Posts by the authors a user follows.
    FollowedBy(DbId),
}

impl PostFeed {
    /// `WHERE` clause over the `p` alias, using `$1` for the key if any.
    pub(crate) fn where_clause(&self) -> &'static str {
        match self {
            PostFeed::All => "",
            PostFeed::Group(_) => "WHERE p.group_id = $1",
            PostFeed::Author(_) => "WHERE p.author_id = $1",
            PostFeed::FollowedBy(_) => {
                "WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)"
            }
        }
    }

    pub(crate) fn key(&self) -> Option<DbId> {
        match self {
            PostFeed::All => None,
            PostFeed::Group(id) | PostFeed::Author(id) | PostFeed::FollowedBy(id) => Some(*id),
        }
    }
}
