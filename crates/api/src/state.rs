use std::sync::Arc;

use crate::cache::PageCache;
use crate::config::ServerConfig;

/// Shared application state available to handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or already shared.
#[derive(Clone)]
pub struct AppState {
    pub pool: yatube_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Rendered index pages, keyed by request URI.
    pub page_cache: Arc<PageCache>,
}

impl AppState {
    pub fn new(pool: yatube_db::DbPool, config: ServerConfig) -> Self {
        let page_cache = PageCache::new(std::time::Duration::from_secs(
            config.index_cache_ttl_secs,
        ));
        Self {
            pool,
            config: Arc::new(config),
            page_cache: Arc::new(page_cache),
        }
    }
}
