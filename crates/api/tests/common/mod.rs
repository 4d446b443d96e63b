#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use yatube_api::auth::jwt::{generate_access_token, JwtConfig};
use yatube_api::auth::password::hash_password;
use yatube_api::config::ServerConfig;
use yatube_api::router::build_app_router;
use yatube_api::state::AppState;
use yatube_db::models::group::{CreateGroup, Group};
use yatube_db::models::post::{CreatePost, Post};
use yatube_db::models::user::{CreateUser, User};
use yatube_db::repositories::{GroupRepo, PostRepo, UserRepo};

pub const TEST_PASSWORD: &str = "Sup3r-secret-pass";

/// Test configuration: fixed JWT secret, a private media directory per app.
pub fn test_config() -> ServerConfig {
    let media_root: PathBuf =
        std::env::temp_dir().join(format!("yatube-test-media-{}", uuid::Uuid::new_v4()));
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        posts_per_page: 10,
        index_cache_ttl_secs: 20,
        media_root,
        max_upload_bytes: 10 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 14,
        },
    }
}

/// The router plus the state behind it, so tests can reach the cache.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Build the full app with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    let router = build_app_router(state.clone(), &config);
    TestApp { router, state }
}

impl TestApp {
    pub fn token_for(&self, user: &User) -> String {
        generate_access_token(user.id, &user.username, &self.state.config.jwt)
            .expect("token generation should succeed")
    }

    /// Number of files under `<media_root>/posts`.
    pub fn stored_post_images(&self) -> usize {
        match std::fs::read_dir(self.state.config.media_root.join("posts")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::get(uri)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form_body(fields)))
                .unwrap(),
        )
        .await
    }

    pub async fn post_form_auth(
        &self,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
    ) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form_body(fields)))
                .unwrap(),
        )
        .await
    }

    /// Multipart post with text fields and an optional `image` file.
    pub async fn post_multipart_auth(
        &self,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> Response<Body> {
        let boundary = "yatube-test-boundary";
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
                     filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        self.send(
            Request::post(uri)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

/// Percent-encode fields as `application/x-www-form-urlencoded`.
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fn encode(value: &str) -> String {
        value
            .bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                b' ' => "+".to_string(),
                _ => format!("%{b:02X}"),
            })
            .collect()
    }
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("redirect must carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, username: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn create_group(pool: &PgPool, slug: &str) -> Group {
    GroupRepo::create(
        pool,
        &CreateGroup {
            title: format!("Группа {slug}"),
            slug: slug.to_string(),
            description: "Тестовое описание".to_string(),
        },
    )
    .await
    .expect("group creation should succeed")
}

pub async fn create_post(pool: &PgPool, author: &User, text: &str, group: Option<&Group>) -> Post {
    PostRepo::create(
        pool,
        &CreatePost {
            author_id: author.id,
            text: text.to_string(),
            group_id: group.map(|g| g.id),
            image: None,
        },
    )
    .await
    .expect("post creation should succeed")
}

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encoding should succeed");
    out.into_inner()
}
