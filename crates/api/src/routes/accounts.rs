//! Route definitions for the `/auth` pages.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::accounts;
use crate::state::AppState;

/// Routes mounted at `/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/signup/",
            get(accounts::signup_form).post(accounts::signup),
        )
        .route("/login/", get(accounts::login_form).post(accounts::login))
        .route("/refresh/", post(accounts::refresh))
        .route("/logout/", get(accounts::logout).post(accounts::logout))
        .route(
            "/password_change/",
            get(accounts::password_change_form).post(accounts::password_change),
        )
        .route(
            "/password_change/done/",
            get(accounts::password_change_done),
        )
}
