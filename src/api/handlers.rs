//! API Handlers
//!
//! HTTP request handlers wiring the page cache to the rendering collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::cache::{CachedPage, PageCache};
use crate::config::Config;
use crate::models::{HealthResponse, StatsResponse};
use crate::render::{RenderedPage, Renderer};

/// Response marker: `hit` when served from cache, `miss` when rendered.
pub const CACHE_MARKER_HEADER: &str = "x-render-cache";
/// On a hit, the entry's original save time in Unix milliseconds.
pub const CACHE_SAVED_HEADER: &str = "x-render-cache-saved";

/// Application state shared across all handlers.
///
/// The cache is one process-wide instance behind a write lock so that each
/// mutation sequence (find, remove, re-append, persist) runs as a single
/// critical section even under parallel request handling.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe page cache
    pub cache: Arc<RwLock<PageCache>>,
    /// External rendering pipeline invoked on cache miss
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    /// Creates a new AppState from an opened cache and a renderer.
    pub fn new(cache: PageCache, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            renderer,
        }
    }

    /// Opens the cache per configuration and wraps it in shared state.
    ///
    /// A corrupt persisted index propagates as a fatal error.
    pub fn from_config(
        config: &Config,
        renderer: Arc<dyn Renderer>,
    ) -> crate::error::Result<Self> {
        let cache = PageCache::open(&config.cache_dir, config.max_entries, config.ttl_ms)?;
        Ok(Self::new(cache, renderer))
    }
}

/// Fallback handler serving every page path.
///
/// Serves from cache when the normalized URL has a fresh entry and no
/// bypass was requested; otherwise renders fresh content and stores it on
/// success. Cache failures never fail the request: they degrade to
/// always-regenerate.
pub async fn page_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let request_url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let bypass = bypass_requested(&uri);

    let cached = {
        let mut cache = state.cache.write().await;
        cache.lookup(&request_url, bypass)
    };
    if let Some(page) = cached {
        return cached_response(page);
    }

    match state.renderer.render(&request_url).await {
        Ok(page) => {
            // Only success responses are cached.
            if page.is_success() {
                let mut cache = state.cache.write().await;
                cache.store(&request_url, page.headers.clone(), &page.body);
            }
            rendered_response(page)
        }
        Err(e) => {
            error!(url = %request_url, error = %e, "renderer failed");
            (StatusCode::BAD_GATEWAY, "rendering failed").into_response()
        }
    }
}

/// Handler for GET /stats
///
/// Returns current cache counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from_stats(&cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Response Assembly ==

fn bypass_requested(uri: &Uri) -> bool {
    uri.query()
        .is_some_and(|q| q.split('&').any(|p| p == "refreshCache=true"))
}

fn cached_response(page: CachedPage) -> Response {
    let mut headers = HeaderMap::new();
    apply_stored_headers(&mut headers, &page.headers);
    headers.insert(
        HeaderName::from_static(CACHE_MARKER_HEADER),
        HeaderValue::from_static("hit"),
    );
    if let Ok(saved) = HeaderValue::from_str(&page.saved_at.to_string()) {
        headers.insert(HeaderName::from_static(CACHE_SAVED_HEADER), saved);
    }
    (StatusCode::OK, headers, page.body).into_response()
}

fn rendered_response(page: RenderedPage) -> Response {
    let status = StatusCode::from_u16(page.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut headers = HeaderMap::new();
    apply_stored_headers(&mut headers, &page.headers);
    headers.insert(
        HeaderName::from_static(CACHE_MARKER_HEADER),
        HeaderValue::from_static("miss"),
    );
    (status, headers, page.body).into_response()
}

fn apply_stored_headers(map: &mut HeaderMap, stored: &HashMap<String, String>) {
    for (name, value) in stored {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            warn!(header = %name, "skipping unrepresentable stored header");
            continue;
        };
        map.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct CountingRenderer {
        renders: AtomicUsize,
    }

    #[async_trait]
    impl Renderer for CountingRenderer {
        async fn render(&self, request_url: &str) -> anyhow::Result<RenderedPage> {
            let n = self.renders.fetch_add(1, Ordering::SeqCst) + 1;
            let mut headers = HashMap::new();
            headers.insert("Content-Type".to_string(), "text/html".to_string());
            Ok(RenderedPage {
                status: 200,
                headers,
                body: format!("render {n} of {request_url}"),
            })
        }
    }

    fn test_state(dir: &std::path::Path) -> (AppState, Arc<CountingRenderer>) {
        let renderer = Arc::new(CountingRenderer {
            renders: AtomicUsize::new(0),
        });
        let cache = PageCache::open(dir, 100, 60_000).unwrap();
        (AppState::new(cache, renderer.clone()), renderer)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let dir = tempdir().unwrap();
        let (state, renderer) = test_state(dir.path());

        let uri: Uri = "/page".parse().unwrap();
        let first = page_handler(State(state.clone()), uri.clone()).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[CACHE_MARKER_HEADER], "miss");

        let second = page_handler(State(state), uri).await;
        assert_eq!(second.headers()[CACHE_MARKER_HEADER], "hit");
        assert!(second.headers().contains_key(CACHE_SAVED_HEADER));
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_param_forces_rerender() {
        let dir = tempdir().unwrap();
        let (state, renderer) = test_state(dir.path());

        let uri: Uri = "/page".parse().unwrap();
        page_handler(State(state.clone()), uri.clone()).await;

        let refresh: Uri = "/page?refreshCache=true".parse().unwrap();
        let refreshed = page_handler(State(state.clone()), refresh).await;
        assert_eq!(refreshed.headers()[CACHE_MARKER_HEADER], "miss");
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);

        // The refreshed copy replaced the original under the normalized key.
        let after = page_handler(State(state), uri).await;
        assert_eq!(after.headers()[CACHE_MARKER_HEADER], "hit");
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stats_handler_reports_counts() {
        let dir = tempdir().unwrap();
        let (state, _) = test_state(dir.path());

        let uri: Uri = "/counted".parse().unwrap();
        page_handler(State(state.clone()), uri.clone()).await; // miss
        page_handler(State(state.clone()), uri).await; // hit

        let Json(stats) = stats_handler(State(state)).await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(response) = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
