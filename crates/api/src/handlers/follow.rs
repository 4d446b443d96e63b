//! Follow and unfollow an author from their profile.

use axum::extract::{Path, State};
use axum::response::Redirect;
use yatube_core::error::CoreError;
use yatube_db::models::user::User;
use yatube_db::repositories::{FollowRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::profile_url;
use crate::middleware::auth::LoginRequired;
use crate::state::AppState;

/// GET /profile/{username}/follow/
///
/// Idempotent. Following yourself is silently ignored.
pub async fn profile_follow(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(username): Path<String>,
) -> AppResult<Redirect> {
    let author = find_author(&state, username).await?;

    if author.id != user.user_id {
        let (_, created) = FollowRepo::get_or_create(&state.pool, user.user_id, author.id).await?;
        if created {
            tracing::info!(user_id = user.user_id, author_id = author.id, "Followed author");
        }
    }

    Ok(Redirect::to(&profile_url(&author.username)))
}

/// GET /profile/{username}/unfollow/
///
/// Removing a follow that does not exist is a no-op.
pub async fn profile_unfollow(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(username): Path<String>,
) -> AppResult<Redirect> {
    let author = find_author(&state, username).await?;

    if FollowRepo::delete(&state.pool, user.user_id, author.id).await? {
        tracing::info!(user_id = user.user_id, author_id = author.id, "Unfollowed author");
    }

    Ok(Redirect::to(&profile_url(&author.username)))
}

async fn find_author(state: &AppState, username: String) -> AppResult<User> {
    UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundBy {
            entity: "User",
            key: username,
        }))
}
