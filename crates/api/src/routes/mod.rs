pub mod accounts;
pub mod health;
pub mod posts;

use axum::Router;

use crate::state::AppState;

/// Build the site route tree.
///
/// ```text
/// /                                    index (cached)
/// /group/{slug}/                       group feed
/// /profile/{username}/                 author feed
/// /profile/{username}/follow/          follow author (login)
/// /profile/{username}/unfollow/        unfollow author (login)
/// /posts/{post_id}/                    detail; POST adds a comment (login)
/// /posts/{post_id}/comment/            add comment (login)
/// /posts/{post_id}/edit/               edit form, save (author only)
/// /posts/{post_id}/delete/             delete (author only)
/// /create/                             create form, publish (login)
/// /follow/                             followed-authors feed (login)
///
/// /auth/signup/                        signup form, register
/// /auth/login/                         login form, issue tokens
/// /auth/refresh/                       rotate tokens
/// /auth/logout/                        revoke sessions
/// /auth/password_change/               form, change (login)
/// /auth/password_change/done/          confirmation (login)
/// ```
pub fn site_routes() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .nest("/auth", accounts::router())
}
