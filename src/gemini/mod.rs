//! Gemini API access
//!
//! A caller-owned [`GeminiClient`] behind the [`ContentGenerator`] trait,
//! plus the wire types for `generateContent`.

mod client;
pub mod types;

pub use client::{ContentGenerator, GeminiClient, GeminiError, MISSING_API_KEY_MESSAGE};
pub use types::{GenerateRequest, GenerationConfig, Part, PDF_MIME};
