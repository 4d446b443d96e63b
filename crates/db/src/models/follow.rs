//! Follow edges between a reader and an author.

use serde::Serialize;
use sqlx::FromRow;
use yatube_core::types::{DbId, Timestamp};

/// A row from the `follows` table: `user_id` follows `author_id`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Follow {
    pub id: DbId,
    pub user_id: DbId,
    pub author_id: DbId,
    pub created_at: Timestamp,
}
