//! Refresh-token sessions.

use sqlx::FromRow;
use yatube_core::types::{DbId, Timestamp};

/// An issued refresh token, stored by hash only.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    /// Set once the token has been spent or the user logged out.
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl RefreshSession {
    /// Whether the token can still be exchanged at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
