//! Request and response bodies for the `generateContent` REST endpoint

use base64::Engine;
use serde::{Deserialize, Serialize};

/// MIME type used for PDF parts.
pub const PDF_MIME: &str = "application/pdf";

/// One piece of user content: text or inline binary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    /// Inline part from raw bytes; the bytes are base64-encoded here.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: Blob {
                mime_type: mime_type.into(),
                data: base64::engine::general_purpose::STANDARD.encode(bytes),
            },
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Part::InlineData { inline_data } => Some(&inline_data.mime_type),
            Part::Text { .. } => None,
        }
    }
}

/// Optional generation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

impl GenerationConfig {
    /// Ask for a JSON response body.
    pub fn json() -> Self {
        Self { response_mime_type: Some("application/json".into()), ..Default::default() }
    }

    /// Disable thinking.
    pub fn no_thinking() -> Self {
        Self { thinking_config: Some(ThinkingConfig { thinking_budget: 0 }), ..Default::default() }
    }

    fn is_empty(&self) -> bool {
        self.response_mime_type.is_none() && self.thinking_config.is_none()
    }
}

/// A single-turn generation request: ordered parts plus optional config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    pub config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts, config: GenerationConfig::default() }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    pub role: &'static str,
    pub parts: &'a [Part],
}

/// Wire body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody<'a> {
    pub contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "config_is_empty")]
    pub generation_config: &'a GenerationConfig,
}

fn config_is_empty(config: &&GenerationConfig) -> bool {
    config.is_empty()
}

impl<'a> GenerateContentBody<'a> {
    pub fn new(request: &'a GenerateRequest) -> Self {
        Self {
            contents: [Content { role: "user", parts: &request.parts }],
            generation_config: &request.config,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thought: Option<bool>,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought.unwrap_or(false))
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
