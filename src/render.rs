//! Renderer Collaborator Seam
//!
//! The cache sits in front of an expensive rendering step. That step is an
//! external collaborator: anything that can turn a request URL into a
//! status, headers, and a body can back the cache. Real deployments plug
//! browser automation or a templating pipeline in here.

use std::collections::HashMap;

use async_trait::async_trait;

/// The output of one render: what the cache stores on success.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// HTTP status of the render; only 2xx results are cached
    pub status: u16,
    /// Response headers to persist alongside the body
    pub headers: HashMap<String, String>,
    /// Rendered response body
    pub body: String,
}

impl RenderedPage {
    /// Whether this render succeeded and is eligible for caching.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Produces fresh page content for a request URL on a cache miss.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, request_url: &str) -> anyhow::Result<RenderedPage>;
}

// == Placeholder Renderer ==
/// Minimal renderer used by the standalone binary.
///
/// Emits a static HTML page echoing the requested path, standing in for the
/// expensive rendering pipeline the cache exists to shield.
#[derive(Debug, Default)]
pub struct PlaceholderRenderer;

#[async_trait]
impl Renderer for PlaceholderRenderer {
    async fn render(&self, request_url: &str) -> anyhow::Result<RenderedPage> {
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "text/html; charset=utf-8".to_string(),
        );
        Ok(RenderedPage {
            status: 200,
            headers,
            body: format!("<html><body><h1>Rendered {request_url}</h1></body></html>"),
        })
    }
}
