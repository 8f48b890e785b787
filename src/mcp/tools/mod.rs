//! MCP tool definitions
//!
//! Each tool is a plain async function over a [`ToolContext`] so it can be
//! exercised without a running server. The server modules only route calls.

pub mod caption;
pub mod compare;
pub mod detect;
pub mod multi_image;
pub mod pdf;
pub mod segment;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{GmcpConfig, DEFAULT_MAX_IMAGE_EDGE, DEFAULT_SEGMENT_OUTPUT_DIR};
use crate::fetch::{FetchError, Fetcher, HttpFetcher, MemoryPartCache, PartCache};
use crate::gemini::{ContentGenerator, GeminiClient, GeminiError};
use crate::imaging::downscale_to_max_edge;

/// MIME type assumed for images when the caller gives none.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

pub(crate) fn default_image_mime() -> String {
    DEFAULT_IMAGE_MIME.to_string()
}

/// Collaborators shared by every tool invocation.
#[derive(Clone)]
pub struct ToolContext {
    generator: Option<Arc<dyn ContentGenerator>>,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<dyn PartCache>,
    max_image_edge: u32,
    segment_output_dir: PathBuf,
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("generator", &self.generator.as_ref().map(|g| g.model().to_string()))
            .field("max_image_edge", &self.max_image_edge)
            .field("segment_output_dir", &self.segment_output_dir)
            .finish_non_exhaustive()
    }
}

impl ToolContext {
    /// Context with default limits and an unbounded in-memory cache.
    ///
    /// `generator` is `None` when no API key is configured; tools then
    /// report the missing key instead of calling out.
    pub fn new(generator: Option<Arc<dyn ContentGenerator>>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            generator,
            fetcher,
            cache: Arc::new(MemoryPartCache::new(None)),
            max_image_edge: DEFAULT_MAX_IMAGE_EDGE,
            segment_output_dir: PathBuf::from(DEFAULT_SEGMENT_OUTPUT_DIR),
        }
    }

    /// Build the production context: reqwest fetcher, Gemini client if keyed.
    pub fn from_config(config: &GmcpConfig) -> Result<Self, FetchError> {
        let fetcher = Arc::new(HttpFetcher::new(config.http.timeout())?);
        let generator: Option<Arc<dyn ContentGenerator>> =
            match GeminiClient::from_config(&config.gemini) {
                Ok(client) => {
                    tracing::info!(model = %client.model(), "Gemini client ready");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            };

        Ok(Self::new(generator, fetcher)
            .with_cache(Arc::new(MemoryPartCache::new(config.cache.capacity)))
            .with_max_image_edge(config.image.max_edge)
            .with_segment_output_dir(config.segment.output_dir.clone()))
    }

    pub fn with_cache(mut self, cache: Arc<dyn PartCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_max_image_edge(mut self, max_edge: u32) -> Self {
        self.max_image_edge = max_edge;
        self
    }

    pub fn with_segment_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.segment_output_dir = dir.into();
        self
    }

    pub fn generator(&self) -> Result<&dyn ContentGenerator, GeminiError> {
        self.generator.as_deref().ok_or(GeminiError::MissingApiKey)
    }

    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    pub fn cache(&self) -> &dyn PartCache {
        self.cache.as_ref()
    }

    pub fn max_image_edge(&self) -> u32 {
        self.max_image_edge
    }

    pub fn segment_output_dir(&self) -> &PathBuf {
        &self.segment_output_dir
    }

    /// Download an image and downscale it for upload.
    pub(crate) async fn prepared_image(&self, url: &str, mime_type: &str) -> Result<Vec<u8>, String> {
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| format!("Failed to download image ({}): {}", url, e))?;
        Ok(downscale_to_max_edge(fetched.bytes, mime_type, self.max_image_edge))
    }
}
