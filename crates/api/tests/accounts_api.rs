//! HTTP-level tests for signup, login, token refresh, logout and
//! password change.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_user, location, TEST_PASSWORD};
use sqlx::PgPool;
use yatube_api::auth::password::verify_password;
use yatube_core::forms::{PASSWORD_INCORRECT_MESSAGE, PASSWORD_MISMATCH_MESSAGE, USERNAME_TAKEN_MESSAGE};
use yatube_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_creates_user_and_redirects_home(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = app
        .post_form(
            "/auth/signup/",
            &[
                ("first_name", "Лев"),
                ("last_name", "Толстой"),
                ("username", "leo"),
                ("email", "leo@example.com"),
                ("password1", "war-and-peace-1869"),
                ("password2", "war-and-peace-1869"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let user = UserRepo::find_by_username(&pool, "leo").await.unwrap().unwrap();
    assert_eq!(user.display_name(), "Лев Толстой");
    assert_eq!(user.email.as_deref(), Some("leo@example.com"));
    assert!(verify_password("war-and-peace-1869", &user.password_hash).unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_rejects_taken_username(pool: PgPool) {
    create_user(&pool, "leo").await;
    let app = build_test_app(pool);

    let response = app
        .post_form(
            "/auth/signup/",
            &[
                ("username", "leo"),
                ("password1", "war-and-peace-1869"),
                ("password2", "war-and-peace-1869"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["username"][0], USERNAME_TAKEN_MESSAGE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_rejects_mismatched_passwords(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = app
        .post_form(
            "/auth/signup/",
            &[
                ("username", "leo"),
                ("password1", "war-and-peace-1869"),
                ("password2", "anna-karenina-1878"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["password2"][0], PASSWORD_MISMATCH_MESSAGE);
    assert!(!UserRepo::username_exists(&pool, "leo").await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_form_describes_fields(pool: PgPool) {
    let app = build_test_app(pool);

    let json = body_json(app.get("/auth/signup/").await).await;

    let names: Vec<&str> = json["data"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["first_name", "last_name", "username", "email", "password1", "password2"]
    );
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_issues_tokens_and_echoes_next(pool: PgPool) {
    let user = create_user(&pool, "leo").await;
    let app = build_test_app(pool);

    let response = app
        .post_form(
            "/auth/login/?next=/create/",
            &[("username", "leo"), ("password", TEST_PASSWORD)],
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert!(json["data"]["refresh_token"].is_string());
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["redirect_to"], "/create/");

    let token = json["data"]["access_token"].as_str().unwrap();
    let create_form = app.get_auth("/create/", token).await;
    assert_eq!(create_form.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_wrong_password_is_401(pool: PgPool) {
    create_user(&pool, "leo").await;
    let app = build_test_app(pool);

    let response = app
        .post_form("/auth/login/", &[("username", "leo"), ("password", "nope")])
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_page_is_public(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.get("/auth/login/?next=/follow/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["next"], "/follow/");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    create_user(&pool, "leo").await;
    let app = build_test_app(pool);

    let login = body_json(
        app.post_form("/auth/login/", &[("username", "leo"), ("password", TEST_PASSWORD)])
            .await,
    )
    .await;
    let refresh_token = login["data"]["refresh_token"].as_str().unwrap().to_string();

    let first = app
        .post_form("/auth/refresh/", &[("refresh_token", refresh_token.as_str())])
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    let reused = app
        .post_form("/auth/refresh/", &[("refresh_token", refresh_token.as_str())])
        .await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_sessions(pool: PgPool) {
    create_user(&pool, "leo").await;
    let app = build_test_app(pool);

    let login = body_json(
        app.post_form("/auth/login/", &[("username", "leo"), ("password", TEST_PASSWORD)])
            .await,
    )
    .await;
    let access = login["data"]["access_token"].as_str().unwrap().to_string();
    let refresh_token = login["data"]["refresh_token"].as_str().unwrap().to_string();

    let logout = body_json(app.get_auth("/auth/logout/", &access).await).await;
    assert_eq!(logout["data"]["revoked_sessions"], 1);

    let refreshed = app
        .post_form("/auth/refresh/", &[("refresh_token", refresh_token.as_str())])
        .await;
    assert_eq!(refreshed.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn anonymous_logout_is_ok(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.get("/auth/logout/").await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Password change
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_change_updates_hash(pool: PgPool) {
    let user = create_user(&pool, "leo").await;
    let app = build_test_app(pool.clone());
    let token = app.token_for(&user);

    let response = app
        .post_form_auth(
            "/auth/password_change/",
            &token,
            &[
                ("old_password", TEST_PASSWORD),
                ("new_password1", "resurrection-1899"),
                ("new_password2", "resurrection-1899"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/password_change/done/");

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(verify_password("resurrection-1899", &stored.password_hash).unwrap());

    let done = app.get_auth("/auth/password_change/done/", &token).await;
    assert_eq!(done.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_change_checks_old_password(pool: PgPool) {
    let user = create_user(&pool, "leo").await;
    let app = build_test_app(pool.clone());

    let response = app
        .post_form_auth(
            "/auth/password_change/",
            &app.token_for(&user),
            &[
                ("old_password", "not-my-password"),
                ("new_password1", "resurrection-1899"),
                ("new_password2", "resurrection-1899"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["old_password"][0], PASSWORD_INCORRECT_MESSAGE);

    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(verify_password(TEST_PASSWORD, &stored.password_hash).unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn password_change_requires_login(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.get("/auth/password_change/").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login/?next=/auth/password_change/");
}
