//! Configuration schema types for `gmcp.toml`
//!
//! Every section is optional; a missing file or section yields the same
//! defaults the servers ship with.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Model used when neither the config file nor `GEMINI_MODEL` names one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Directory segmentation masks and overlays are written to.
pub const DEFAULT_SEGMENT_OUTPUT_DIR: &str = "segmentation_outputs";

/// Longest image edge sent to the model.
pub const DEFAULT_MAX_IMAGE_EDGE: u32 = 1024;

/// Gemini API section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model name passed to `generateContent`
    #[serde(default = "default_model")]
    pub model: String,
    /// API base URL (no trailing path)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on a single model call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// API key; only ever populated from `GEMINI_API_KEY`
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    6000
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            api_key: None,
        }
    }
}

impl GeminiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// HTTP download section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for downloading source documents and images, in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

fn default_http_timeout() -> u64 {
    6000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_http_timeout() }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Image preparation section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Images whose longest edge exceeds this are downscaled before upload
    #[serde(default = "default_max_edge")]
    pub max_edge: u32,
}

fn default_max_edge() -> u32 {
    DEFAULT_MAX_IMAGE_EDGE
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self { max_edge: default_max_edge() }
    }
}

/// Segmentation output section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Directory receiving `<label>_<i>_mask.png` / `<label>_<i>_overlay.png`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SEGMENT_OUTPUT_DIR)
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self { output_dir: default_output_dir() }
    }
}

/// PDF part cache section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached documents (unbounded when omitted)
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Root configuration from `gmcp.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GmcpConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "http.timeout_secs")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gmcp.toml: '{}' {}", self.field, self.message)
    }
}

impl GmcpConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.gemini.model.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "gemini.model".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if !self.gemini.base_url.starts_with("http://")
            && !self.gemini.base_url.starts_with("https://")
        {
            errors.push(ConfigValidationError {
                field: "gemini.base_url".to_string(),
                message: "must be an http:// or https:// URL".to_string(),
            });
        }

        if self.gemini.request_timeout_secs == 0 {
            errors.push(ConfigValidationError {
                field: "gemini.request_timeout_secs".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.http.timeout_secs == 0 {
            errors.push(ConfigValidationError {
                field: "http.timeout_secs".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.image.max_edge == 0 {
            errors.push(ConfigValidationError {
                field: "image.max_edge".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.segment.output_dir.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "segment.output_dir".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        if self.cache.capacity == Some(0) {
            errors.push(ConfigValidationError {
                field: "cache.capacity".to_string(),
                message: "must be positive when set".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
