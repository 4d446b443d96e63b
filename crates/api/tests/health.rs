//! Health endpoint, 404 fallback and middleware headers.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_path_is_json_404_with_path(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.get("/unexisting_page/").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["path"], "/unexisting_page/");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn responses_carry_request_id(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app.get("/health").await;

    assert!(response.headers().contains_key("x-request-id"));
}
