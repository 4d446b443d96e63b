//! Authorship checks for post mutations.

use crate::error::CoreError;
use crate::types::DbId;

/// Whether `user_id` owns content written by `author_id`.
pub fn is_author(user_id: DbId, author_id: DbId) -> bool {
    user_id == author_id
}

/// Reject with [`CoreError::Forbidden`] unless the caller wrote the content.
///
/// Every handler that edits or deletes a post goes through this one check.
pub fn ensure_author(user_id: DbId, author_id: DbId) -> Result<(), CoreError> {
    if is_author(user_id, author_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the author can change this post".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn author_passes() {
        assert!(ensure_author(7, 7).is_ok());
    }

    #[test]
    fn other_user_is_forbidden() {
        assert_matches!(ensure_author(7, 8), Err(CoreError::Forbidden(_)));
    }
}
