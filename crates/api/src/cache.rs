//! In-process cache for rendered index pages.
//!
//! Entries live for a fixed TTL. Writes that change what the index shows
//! (post create, edit, delete) drop every entry under [`INDEX_CACHE_PREFIX`],
//! so readers see stale content only for changes made outside those paths.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tokio::sync::RwLock;

/// Key prefix shared by all cached index pages.
pub const INDEX_CACHE_PREFIX: &str = "index_page";

/// Cache key for one index URI (path plus query, so each page is separate).
pub fn index_cache_key(path_and_query: &str) -> String {
    format!("{INDEX_CACHE_PREFIX}:{path_and_query}")
}

/// A stored JSON response body.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub body: Bytes,
}

impl IntoResponse for CachedPage {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

struct Entry {
    page: CachedPage,
    expires_at: Instant,
}

/// TTL-bounded page store.
///
/// Thread-safe via interior `RwLock`; shared through `Arc` in the app state.
pub struct PageCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// A live entry for `key`. Expired entries are treated as absent.
    pub async fn get(&self, key: &str) -> Option<CachedPage> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.page.clone())
    }

    /// Store `body` under `key` for one TTL, replacing any previous entry.
    pub async fn insert(&self, key: String, body: impl Into<Bytes>) -> CachedPage {
        let page = CachedPage { body: body.into() };
        let entry = Entry {
            page: page.clone(),
            expires_at: Instant::now() + self.ttl,
        };
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(key, entry);
        page
    }

    /// Drop every entry whose key starts with `prefix`. Returns how many went.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, live or not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
