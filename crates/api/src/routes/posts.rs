//! Route definitions for feeds, posts, comments and follows.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{feeds, follow, posts};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feeds::index))
        .route("/group/{slug}/", get(feeds::group_posts))
        .route("/profile/{username}/", get(feeds::profile))
        .route("/profile/{username}/follow/", get(follow::profile_follow))
        .route("/profile/{username}/unfollow/", get(follow::profile_unfollow))
        .route(
            "/posts/{post_id}/",
            get(posts::post_detail).post(posts::add_comment),
        )
        .route("/posts/{post_id}/comment/", post(posts::add_comment))
        .route(
            "/posts/{post_id}/edit/",
            get(posts::edit_form).post(posts::post_edit),
        )
        .route("/posts/{post_id}/delete/", post(posts::post_delete))
        .route("/create/", get(posts::create_form).post(posts::post_create))
        .route("/follow/", get(feeds::follow_index))
}
