//! Post groups (communities a post can be filed under).

use std::fmt;

use serde::Serialize;
use sqlx::FromRow;
use yatube_core::types::DbId;

/// A row from the `groups` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// DTO for creating a group.
#[derive(Debug, Clone)]
pub struct CreateGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}
