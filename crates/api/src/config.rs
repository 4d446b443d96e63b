use std::path::PathBuf;

use yatube_core::pagination::POSTS_PER_PAGE;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Every field except the JWT secret has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Posts shown on one feed page (default: `10`).
    pub posts_per_page: i64,
    /// Lifetime of a cached index page in seconds (default: `20`).
    pub index_cache_ttl_secs: u64,
    /// Directory uploaded images are written under and served from.
    pub media_root: PathBuf,
    /// Largest accepted request body in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HOST`                 | `0.0.0.0`                |
    /// | `PORT`                 | `8000`                   |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                     |
    /// | `POSTS_PER_PAGE`       | `10`                     |
    /// | `INDEX_CACHE_TTL_SECS` | `20`                     |
    /// | `MEDIA_ROOT`           | `media`                  |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`               |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let posts_per_page: i64 = std::env::var("POSTS_PER_PAGE")
            .unwrap_or_else(|_| POSTS_PER_PAGE.to_string())
            .parse()
            .expect("POSTS_PER_PAGE must be a valid i64");
        assert!(posts_per_page > 0, "POSTS_PER_PAGE must be positive");

        let index_cache_ttl_secs: u64 = std::env::var("INDEX_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("INDEX_CACHE_TTL_SECS must be a valid u64");

        let media_root =
            PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            posts_per_page,
            index_cache_ttl_secs,
            media_root,
            max_upload_bytes,
            jwt,
        }
    }
}
