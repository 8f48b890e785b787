//! Downloading source documents and caching their inline parts

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::gemini::Part;

/// Download failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL scheme. Only http:// and https:// are supported")]
    UnsupportedScheme,
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("download timeout")]
    Timeout,
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// A downloaded body with its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl Fetched {
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / (1024.0 * 1024.0)
    }
}

/// Source of remote bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError>;
}

/// reqwest-backed fetcher following redirects.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FetchError::UnsupportedScheme);
        }

        tracing::info!(url, "downloading");
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url, %status, "download failed");
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(classify)?.to_vec();

        let fetched = Fetched { bytes, content_type };
        tracing::info!(url, size_mb = %format!("{:.2}", fetched.size_mb()), "downloaded");
        Ok(fetched)
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(e)
    }
}

/// Whether a download looks like a PDF, by content type or URL suffix.
pub fn looks_like_pdf(url: &str, content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("pdf"))
        || url.to_ascii_lowercase().ends_with(".pdf")
}

/// URL-keyed cache of prepared parts.
pub trait PartCache: Send + Sync {
    fn get(&self, url: &str) -> Option<Part>;
    fn put(&self, url: &str, part: Part);
}

/// In-memory cache with an optional entry limit.
///
/// There is no eviction: once full, new entries are simply not stored.
#[derive(Debug, Default)]
pub struct MemoryPartCache {
    entries: Mutex<HashMap<String, Part>>,
    capacity: Option<usize>,
}

impl MemoryPartCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self { entries: Mutex::new(HashMap::new()), capacity }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartCache for MemoryPartCache {
    fn get(&self, url: &str) -> Option<Part> {
        self.entries.lock().ok()?.get(url).cloned()
    }

    fn put(&self, url: &str, part: Part) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        let full = self.capacity.is_some_and(|cap| entries.len() >= cap);
        if full && !entries.contains_key(url) {
            tracing::debug!(url, "part cache full, not caching");
            return;
        }
        entries.insert(url.to_string(), part);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf("https://x/doc", Some("application/pdf")));
        assert!(looks_like_pdf("https://x/DOC.PDF", Some("text/html")));
        assert!(looks_like_pdf("https://x/a.pdf", None));
        assert!(!looks_like_pdf("https://x/page", Some("text/html")));
    }

    #[test]
    fn test_cache_round_trip() {
        let cache = MemoryPartCache::new(None);
        assert!(cache.get("u").is_none());
        cache.put("u", Part::text("a"));
        assert_eq!(cache.get("u"), Some(Part::text("a")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_capacity_stops_growth() {
        let cache = MemoryPartCache::new(Some(1));
        cache.put("a", Part::text("1"));
        cache.put("b", Part::text("2"));
        assert!(cache.get("b").is_none());
        // Existing keys may still be replaced
        cache.put("a", Part::text("3"));
        assert_eq!(cache.get("a"), Some(Part::text("3")));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1)).unwrap();
        let err = fetcher.fetch("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme));
    }

    #[test]
    fn test_size_mb() {
        let fetched = Fetched { bytes: vec![0; 1024 * 1024], content_type: None };
        assert!((fetched.size_mb() - 1.0).abs() < f64::EPSILON);
    }
}
